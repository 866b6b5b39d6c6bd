/// Integration tests against on-disk databases
mod basic_integration;
mod mcp_session;
