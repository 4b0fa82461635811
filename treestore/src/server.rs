// ---------------------------------------------------------------------------
// TreeServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Reads one request per line, runs it against the owned TreeStore to
// completion, publishes queued change events as `tree/changed`
// notifications and then writes the response. The read loop is the single
// point of access to the store, so requests are strictly serialised.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{EngineError, TreeError};
use crate::protocol::*;
use crate::search::SearchOptions;
use crate::store::TreeStore;
use crate::transport::NdjsonTransport;

pub const CHANGED_NOTIFICATION: &str = "tree/changed";

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// JSON-RPC server that dispatches requests to a [`TreeStore`].
pub struct TreeServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	store: TreeStore,
}

impl<W: Write> TreeServer<W> {
	pub fn new(transport: NdjsonTransport<W>, store: TreeStore) -> Self {
		Self { transport, store }
	}

	pub fn into_parts(self) -> (NdjsonTransport<W>, TreeStore) {
		(self.transport, self.store)
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), EngineError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Serve every line of `reader` until EOF.
	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), EngineError> {
		for line_result in reader.lines() {
			let line = line_result?;
			let trimmed = line.trim();
			if trimmed.is_empty() {
				continue;
			}

			match serde_json::from_str::<JsonRpcRequest>(trimmed) {
				Ok(req) => self.dispatch(req),
				Err(e) => {
					tracing::warn!("Parse error: {}", e);
					self.transport.write_error(
						0,
						INTERNAL_ERROR,
						"Parse error: invalid JSON",
						None,
					);
				}
			}
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let store = &mut self.store;
		let result = match req.method.as_str() {
			// -- Structure -----------------------------------------------
			"tree/setStructure" => handle_set_structure(store, req.params),
			"tree/get" => Ok(json!({ "structure": store.structure() })),

			// -- Selection -----------------------------------------------
			"tree/selectFile" => handle_select_file(store, req.params),
			"tree/selected" => to_value(&SelectedResult {
				name: store.selected_file(),
				node: store.selected_node(),
			}),

			// -- Mutations -----------------------------------------------
			"tree/createItem" => handle_create(store, req.params),
			"tree/renameItem" => handle_rename(store, req.params),
			"tree/deleteItem" => handle_delete(store, req.params),
			"tree/moveItem" => handle_move(store, req.params),

			// -- Search --------------------------------------------------
			"tree/setSearchQuery" => handle_set_search_query(store, req.params),
			"tree/performSearch" => handle_perform_search(store, req.params),
			"tree/searchState" => to_value(&SearchStateResult {
				query: store.search_query(),
				results: store.search_results(),
			}),

			// -- Errors --------------------------------------------------
			"tree/error" => Ok(json!({
				"error": store.last_error().map(TreeError::to_json_rpc_error),
			})),
			"tree/clearError" => {
				store.clear_error();
				Ok(json!({}))
			}

			// -- Inspection ----------------------------------------------
			"tree/render" => handle_render(store, req.params),
			"tree/metrics" => to_value(&store.metrics()),

			// -- Unknown -------------------------------------------------
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		for event in self.store.drain_events() {
			self.transport.write_notification(CHANGED_NOTIFICATION, &event);
		}

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(EngineError::InvalidParams(message)) => {
				tracing::warn!(method = %req.method, "{}", message);
				self.transport
					.write_error(id, INVALID_PARAMS, format!("Invalid params: {}", message), None);
			}
			Err(EngineError::Tree(e)) => {
				self.transport
					.write_error(id, TREE_ERROR, e.to_string(), Some(e.to_json_rpc_error()));
			}
			Err(e) => self.transport.write_error(
				id,
				INTERNAL_ERROR,
				e.to_string(),
				Some(json!({ "engineCode": e.code() })),
			),
		}
	}
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, EngineError> {
	serde_json::from_value(params).map_err(|e| EngineError::InvalidParams(e.to_string()))
}

fn to_value(value: &impl serde::Serialize) -> Result<serde_json::Value, EngineError> {
	Ok(serde_json::to_value(value)?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_set_structure(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: SetStructureParams = parse_params(params)?;
	store.set_structure(p.structure)?;
	Ok(json!({}))
}

fn handle_select_file(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: SelectFileParams = parse_params(params)?;
	store.select_file(p.name);
	Ok(json!({}))
}

fn handle_create(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: CreateItemParams = parse_params(params)?;
	let path = p.path.unwrap_or_default().into_segments();
	store.create(&path, &p.name, p.kind)?;
	Ok(json!({}))
}

fn handle_rename(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: RenameItemParams = parse_params(params)?;
	let path = p.path.unwrap_or_default().into_segments();
	store.rename(&path, &p.old_name, &p.new_name)?;
	Ok(json!({}))
}

fn handle_delete(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: DeleteItemParams = parse_params(params)?;
	let path = p.path.unwrap_or_default().into_segments();
	store.delete(&path, &p.name)?;
	Ok(json!({}))
}

fn handle_move(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: MoveItemParams = parse_params(params)?;
	let source_path = p.source_path.unwrap_or_default().into_segments();
	let target_path = p.target_path.unwrap_or_default().into_segments();
	store.move_item(&source_path, &p.source_name, &target_path)?;
	Ok(json!({}))
}

fn handle_set_search_query(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: SearchQueryParams = parse_params(params)?;
	store.set_search_query(p.query);
	Ok(json!({}))
}

fn handle_perform_search(
	store: &mut TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: PerformSearchParams = parse_params(params)?;
	let options = SearchOptions {
		mode: p.mode.unwrap_or_default(),
		max_results: p.max_results,
	};
	let results = store.perform_search_with(&p.query, &options)?;
	Ok(json!({ "results": results }))
}

fn handle_render(
	store: &TreeStore,
	params: serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
	let p: RenderParams = if params.is_null() {
		RenderParams::default()
	} else {
		parse_params(params)?
	};
	let path = p.path.unwrap_or_default().into_segments();
	let text = store.render(&path)?;
	Ok(json!({ "text": text }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
