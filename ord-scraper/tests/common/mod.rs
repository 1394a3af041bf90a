#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ord_scraper::schema::{
    Compound, CompoundIdentifier, CompoundIdentifierType, ProductCompound, ReactionInput,
    ReactionOutcome, ReactionRoleType,
};
use ord_scraper::{FetchConfig, PollConfig, Reaction, ScrapeConfig};
use prost::Message;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fast retry and poll timings so failure paths finish quickly.
pub fn test_config(api_base: &str) -> ScrapeConfig {
    ScrapeConfig {
        fetch: FetchConfig {
            api_base: api_base.to_string(),
            user_agent: "ORD-Scraper-Test/1.0".to_string(),
            timeout_seconds: 5,
            max_retries: 2,
            retry_delay_ms: 10,
            max_retry_delay_ms: 40,
        },
        poll: PollConfig {
            poll_interval_ms: 10,
            poll_timeout_ms: 2_000,
            request_timeout_seconds: 5,
        },
        dataset_pause_ms: 0,
        ..ScrapeConfig::default()
    }
}

pub fn compound(value: &str, role: ReactionRoleType) -> Compound {
    Compound {
        identifiers: vec![CompoundIdentifier {
            r#type: CompoundIdentifierType::Smiles as i32,
            details: String::new(),
            value: value.to_string(),
        }],
        reaction_role: role as i32,
    }
}

/// A Buchwald-Hartwig style coupling with one group per core category
/// plus an additive that falls outside them.
pub fn coupling_reaction(reaction_id: &str, successful: bool) -> Reaction {
    let groups = [
        ("Aryl_halide", compound("Brc1ccc(C)cc1", ReactionRoleType::Reactant)),
        ("amine", compound("Cc1ccc(N)cc1", ReactionRoleType::Reactant)),
        ("Pd_ligand_1", compound("CC(C)c1cc(C(C)C)c(-c2ccccc2P(C2CCCCC2)C2CCCCC2)c(C(C)C)c1", ReactionRoleType::Reagent)),
        ("base", compound("CN1CCCN2CCCN=C12", ReactionRoleType::Reagent)),
        ("Solvent", compound("CS(C)=O", ReactionRoleType::Solvent)),
        ("additive", compound("Cc1ccon1", ReactionRoleType::Reagent)),
    ];

    Reaction {
        reaction_id: reaction_id.to_string(),
        inputs: groups
            .into_iter()
            .map(|(name, c)| (name.to_string(), ReactionInput { components: vec![c] }))
            .collect(),
        outcomes: vec![ReactionOutcome {
            products: if successful {
                vec![ProductCompound {
                    is_desired_product: Some(true),
                    reaction_role: ReactionRoleType::Product as i32,
                    ..Default::default()
                }]
            } else {
                Vec::new()
            },
        }],
    }
}

pub fn encode(reaction: &Reaction) -> String {
    STANDARD.encode(reaction.encode_to_vec())
}
