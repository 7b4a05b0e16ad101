use serde::de::DeserializeOwned;

use crate::error::GenError;

/// Deserialize a schema document with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, GenError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(GenError::schema_invalid(
                format!("/{}", path.replace('.', "/")),
                err.into_inner().to_string(),
            ))
        }
    }
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GenError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(GenError::schema_invalid(
                format!("/{}", path.replace('.', "/")),
                err.into_inner().to_string(),
            ))
        }
    }
}
