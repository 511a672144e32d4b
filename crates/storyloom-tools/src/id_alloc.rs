//! Fresh object ids.
//!
//! Ids have the form `obj_<unix-millis>_<suffix>` where the suffix is four
//! random lowercase alphanumerics. Every candidate is checked against all
//! ids already in the state, so ids are never reused even if the clock
//! stalls.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use storyloom_types::{EntityId, GameState};

use crate::error::ToolError;

/// Random characters appended to the timestamp.
const SUFFIX_LEN: usize = 4;

/// Candidates tried before giving up.
const MAX_ATTEMPTS: u32 = 32;

/// Allocate an object id unused by any collection of `state`.
///
/// # Errors
///
/// Returns [`ToolError::IdExhausted`] if every candidate collided.
pub fn allocate_object_id(state: &GameState) -> Result<EntityId, ToolError> {
    let mut rng = rand::rng();
    let millis = Utc::now().timestamp_millis();

    for _ in 0..MAX_ATTEMPTS {
        let suffix: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        let candidate = format!("obj_{millis}_{suffix}");
        if !state.contains_id(&candidate) {
            return Ok(EntityId::new(candidate));
        }
    }

    Err(ToolError::IdExhausted { attempts: MAX_ATTEMPTS })
}
