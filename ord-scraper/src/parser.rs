use crate::schema::{Reaction, ReactionSchema};
use crate::types::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::debug;

/// Turns the base64 payload of a record envelope into a [`Reaction`].
#[derive(Clone)]
pub struct RecordDecoder {
    schema: Arc<dyn ReactionSchema>,
}

impl RecordDecoder {
    pub fn new(schema: Arc<dyn ReactionSchema>) -> Self {
        Self { schema }
    }

    pub fn decode(&self, payload_b64: &str) -> Result<Reaction> {
        let raw = STANDARD.decode(payload_b64.trim())?;
        debug!("Decoding reaction payload ({} bytes)", raw.len());
        self.schema.decode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OrdSchema;
    use crate::types::ScraperError;
    use prost::Message;

    fn decoder() -> RecordDecoder {
        RecordDecoder::new(Arc::new(OrdSchema))
    }

    #[test]
    fn decodes_base64_encoded_reaction() {
        let reaction = Reaction {
            reaction_id: "ord-4ab5".to_string(),
            ..Default::default()
        };
        let payload = STANDARD.encode(reaction.encode_to_vec());

        let decoded = decoder().decode(&payload).unwrap();
        assert_eq!(decoded.reaction_id, "ord-4ab5");
        assert!(decoded.inputs.is_empty());
    }

    #[test]
    fn invalid_base64_is_reported_as_such() {
        let result = decoder().decode("not*base64!");
        assert!(matches!(result, Err(ScraperError::Base64(_))));
    }

    #[test]
    fn valid_base64_with_bad_protobuf_is_a_decode_error() {
        let payload = STANDARD.encode([0xff, 0xff, 0xff]);
        let result = decoder().decode(&payload);
        assert!(matches!(result, Err(ScraperError::Decode(_))));
    }
}
