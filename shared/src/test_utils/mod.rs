pub mod http_test_utils;
pub mod jwt;
pub mod mock_auth_resolver;
pub mod mock_workflow_run_store;
pub mod test_logging;
