pub(crate) mod token_payload;
