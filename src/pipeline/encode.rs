//! Payload encoding: raw PDF bytes → base64 inline-data part.
//!
//! The Gemini API accepts documents as base64 blobs embedded in the JSON
//! request body (`inline_data`). The whole PDF goes up in one part — layout
//! analysis needs the document's page flow, so splitting it locally would
//! only degrade the extraction.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::debug;

/// A base64 payload with its MIME type, matching the wire's `inline_data`
/// object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Encode PDF bytes as an inline-data part ready for the request body.
pub fn encode_pdf(bytes: &[u8]) -> InlineData {
    let data = STANDARD.encode(bytes);
    debug!("Encoded PDF → {} bytes base64", data.len());
    InlineData {
        mime_type: "application/pdf".to_string(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_round_trippable_base64() {
        let part = encode_pdf(b"%PDF-1.4 minimal");
        assert_eq!(part.mime_type, "application/pdf");
        let decoded = STANDARD.decode(&part.data).expect("valid base64");
        assert_eq!(decoded, b"%PDF-1.4 minimal");
    }

    #[test]
    fn serialises_with_wire_field_names() {
        let part = encode_pdf(b"%PDF");
        let json = serde_json::to_value(&part).unwrap();
        assert!(json.get("mime_type").is_some());
        assert!(json.get("data").is_some());
    }
}
