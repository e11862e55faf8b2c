mod bson;
mod document;
mod encoder_decoder;
mod extjson;
mod macros;
mod oid;
