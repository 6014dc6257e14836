pub mod commands;
pub mod dialog;
pub mod gesture;
pub mod history;
pub mod interceptor;
pub mod notifications;
pub mod overlay;
pub mod panel;
pub mod settings;
pub mod suppression;
pub mod toastr;
