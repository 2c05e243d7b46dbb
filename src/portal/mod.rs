pub(crate) mod google_login;
pub(crate) mod listen;
pub(crate) mod oauth;
pub(crate) mod pages;
pub(crate) mod routes;
pub(crate) mod server;
