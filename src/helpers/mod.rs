pub mod handler_404;
pub mod service_response;
