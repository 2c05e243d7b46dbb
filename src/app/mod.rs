pub(crate) mod app_state;
pub(crate) mod logging;
