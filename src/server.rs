//! MCP server exposing the documentation index as tools.

use crate::config::Config;
use crate::state::IndexState;
use crate::tools::{
    LoadIndexRequest, LookupRequest, SearchRequest, handle_load_index, handle_lookup,
    handle_search,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for documentation keyword search
#[derive(Clone)]
pub struct DocSearchServer {
    /// Shared index state (active index, recent indices, config)
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocSearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocSearchServer {
    pub fn new(config: Config) -> Self {
        Self::with_state(Arc::new(IndexState::new(config)))
    }

    pub fn with_state(state: Arc<IndexState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Load a documentation search index from partition files or generated search directories (e.g. Doxygen `html/search/`). Replaces the active index; a failed load keeps the previous one.",
        input_schema = inline_schema_for_type::<LoadIndexRequest>()
    )]
    async fn load_index(
        &self,
        Parameters(request): Parameters<LoadIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_load_index(&self.state, request).await
    }

    #[tool(
        description = "Search documentation keywords (classes, functions, members, enums, ...). Prefix mode by default, case-insensitive. Results are ordered alphabetically by keyword, most-referenced first within a keyword.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Look up one exact keyword and list every documentation page and owner it appears under.",
        input_schema = inline_schema_for_type::<LookupRequest>()
    )]
    async fn lookup(
        &self,
        Parameters(request): Parameters<LookupRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for DocSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docsearch: keyword search over generated documentation indices. \
                 Sources listed in the config file are loaded on startup. \
                 Use load_index to load another search directory, then search or lookup."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns. This ensures MCP Inspector
/// displays enums as dropdown widgets rather than raw JSON input fields.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
