// Feature orchestrators: each composes prompt → AI pipeline → normalizer and
// returns a fully-defaulted domain object or a feature-named error.
// All model calls go through the ai module — no direct API calls here.

pub mod ats;
pub mod cover_letter;
pub mod handlers;
pub mod insights;
pub mod normalize;
pub mod prompts;
pub mod quiz;
pub mod roadmap;
