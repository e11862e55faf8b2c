use base64::{engine::general_purpose::STANDARD, Engine};

pub(crate) fn encode(input: impl AsRef<[u8]>) -> String {
    STANDARD.encode(input)
}

pub(crate) fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(input)
}
