pub(crate) mod google;
