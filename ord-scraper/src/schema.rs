//! Reaction record schema.
//!
//! Message definitions mirror the subset of the Open Reaction Database
//! `reaction.proto` that extraction reads. Tag numbers match the upstream
//! schema and every other field is skipped during decoding.

use crate::types::{Result, ScraperError};
use prost::Message;
use std::collections::BTreeMap;

#[derive(Clone, PartialEq, Message)]
pub struct Reaction {
    #[prost(btree_map = "string, message", tag = "2")]
    pub inputs: BTreeMap<String, ReactionInput>,
    #[prost(message, repeated, tag = "8")]
    pub outcomes: Vec<ReactionOutcome>,
    #[prost(string, tag = "10")]
    pub reaction_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReactionInput {
    #[prost(message, repeated, tag = "1")]
    pub components: Vec<Compound>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Compound {
    #[prost(message, repeated, tag = "1")]
    pub identifiers: Vec<CompoundIdentifier>,
    #[prost(enumeration = "ReactionRoleType", tag = "3")]
    pub reaction_role: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct CompoundIdentifier {
    #[prost(enumeration = "CompoundIdentifierType", tag = "1")]
    pub r#type: i32,
    #[prost(string, tag = "2")]
    pub details: String,
    #[prost(string, tag = "3")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReactionOutcome {
    #[prost(message, repeated, tag = "3")]
    pub products: Vec<ProductCompound>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProductCompound {
    #[prost(message, repeated, tag = "1")]
    pub identifiers: Vec<CompoundIdentifier>,
    #[prost(bool, optional, tag = "2")]
    pub is_desired_product: Option<bool>,
    #[prost(enumeration = "ReactionRoleType", tag = "7")]
    pub reaction_role: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ReactionRoleType {
    Unspecified = 0,
    Reactant = 1,
    Reagent = 2,
    Solvent = 3,
    Catalyst = 4,
    Workup = 5,
    InternalStandard = 6,
    AuthenticStandard = 7,
    Product = 8,
    Byproduct = 9,
    SideProduct = 10,
}

impl ReactionRoleType {
    /// The enum value name as written in the protobuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ReactionRoleType::Unspecified => "UNSPECIFIED",
            ReactionRoleType::Reactant => "REACTANT",
            ReactionRoleType::Reagent => "REAGENT",
            ReactionRoleType::Solvent => "SOLVENT",
            ReactionRoleType::Catalyst => "CATALYST",
            ReactionRoleType::Workup => "WORKUP",
            ReactionRoleType::InternalStandard => "INTERNAL_STANDARD",
            ReactionRoleType::AuthenticStandard => "AUTHENTIC_STANDARD",
            ReactionRoleType::Product => "PRODUCT",
            ReactionRoleType::Byproduct => "BYPRODUCT",
            ReactionRoleType::SideProduct => "SIDE_PRODUCT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum CompoundIdentifierType {
    Unspecified = 0,
    Custom = 1,
    Smiles = 2,
    Inchi = 3,
    Molblock = 4,
    IupacName = 5,
    Name = 6,
    CasNumber = 7,
    PubchemCid = 8,
    ChemspiderId = 9,
    Cxsmiles = 10,
    InchiKey = 11,
    Xyz = 12,
    UniprotId = 13,
    PdbId = 14,
    AminoAcidSequence = 15,
    Helm = 16,
    Mdl = 17,
}

/// Decoding and role lookup for reaction records.
///
/// The scraper only talks to the record format through this trait, and
/// checks [`ReactionSchema::ensure_available`] once before any dataset work.
pub trait ReactionSchema: Send + Sync {
    /// Fails with [`ScraperError::SchemaUnavailable`] if the schema cannot be used.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Reaction>;

    fn role_name(&self, code: i32) -> Result<String>;
}

/// The compiled-in ORD schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdSchema;

impl ReactionSchema for OrdSchema {
    fn ensure_available(&self) -> Result<()> {
        let sample = Reaction {
            reaction_id: "sample".to_string(),
            ..Default::default()
        };
        let decoded = self
            .decode(&sample.encode_to_vec())
            .map_err(|e| ScraperError::SchemaUnavailable(e.to_string()))?;
        if decoded != sample {
            return Err(ScraperError::SchemaUnavailable(
                "reaction messages do not survive an encode/decode cycle".to_string(),
            ));
        }
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Reaction> {
        Ok(Reaction::decode(bytes)?)
    }

    fn role_name(&self, code: i32) -> Result<String> {
        ReactionRoleType::try_from(code)
            .map(|role| role.as_str_name().to_string())
            .map_err(|_| ScraperError::UnknownRole(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_follow_protobuf_spelling() {
        let schema = OrdSchema;
        assert_eq!(schema.role_name(ReactionRoleType::Reactant as i32).unwrap(), "REACTANT");
        assert_eq!(schema.role_name(ReactionRoleType::SideProduct as i32).unwrap(), "SIDE_PRODUCT");
        assert_eq!(schema.role_name(0).unwrap(), "UNSPECIFIED");
    }

    #[test]
    fn unknown_role_code_is_an_error() {
        let schema = OrdSchema;
        assert!(matches!(schema.role_name(99), Err(ScraperError::UnknownRole(99))));
    }

    #[test]
    fn compiled_schema_is_available() {
        assert!(OrdSchema.ensure_available().is_ok());
    }

    #[test]
    fn decodes_nested_inputs_and_outcomes() {
        let mut inputs = BTreeMap::new();
        inputs.insert(
            "base".to_string(),
            ReactionInput {
                components: vec![Compound {
                    identifiers: vec![CompoundIdentifier {
                        r#type: CompoundIdentifierType::Smiles as i32,
                        details: String::new(),
                        value: "[K+].[K+].[O-]C([O-])=O".to_string(),
                    }],
                    reaction_role: ReactionRoleType::Reagent as i32,
                }],
            },
        );
        let reaction = Reaction {
            reaction_id: "ord-0001".to_string(),
            inputs,
            outcomes: vec![ReactionOutcome {
                products: vec![ProductCompound {
                    is_desired_product: Some(true),
                    reaction_role: ReactionRoleType::Product as i32,
                    ..Default::default()
                }],
            }],
        };

        let decoded = OrdSchema.decode(&reaction.encode_to_vec()).unwrap();
        assert_eq!(decoded, reaction);
        assert_eq!(decoded.inputs["base"].components[0].reaction_role(), ReactionRoleType::Reagent);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = OrdSchema.decode(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(ScraperError::Decode(_))));
    }
}
