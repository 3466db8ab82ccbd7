use crate::models::JoinKey;

/// Builds the canonical cross-source key. Make and model are trimmed and
/// uppercased; abbreviations and spelling variants are left alone.
pub struct KeyNormalizer;

impl KeyNormalizer {
    pub fn normalize(year: i32, make: &str, model: &str) -> JoinKey {
        JoinKey {
            year,
            make: make.trim().to_uppercase(),
            model: model.trim().to_uppercase(),
        }
    }
}

/// Records that can be placed on the join key.
pub trait Keyed {
    fn join_key(&self) -> JoinKey;
}

impl Keyed for crate::models::CleanedVehicleRecord {
    fn join_key(&self) -> JoinKey {
        KeyNormalizer::normalize(self.year, &self.make, &self.model)
    }
}

impl Keyed for crate::models::ComplaintRecord {
    fn join_key(&self) -> JoinKey {
        KeyNormalizer::normalize(self.year, &self.make, &self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::models::vehicle::fixtures::volt;

    #[test]
    fn test_normalization() {
        let key = KeyNormalizer::normalize(2011, "  Chevrolet ", "Volt\t");
        assert_eq!(key.make, "CHEVROLET");
        assert_eq!(key.model, "VOLT");
        assert_eq!(key.to_string(), "2011 CHEVROLET VOLT");
    }

    #[test]
    fn test_idempotent() {
        let once = KeyNormalizer::normalize(2011, " chevrolet", "volt ");
        let twice = KeyNormalizer::normalize(once.year, &once.make, &once.model);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_abbreviation_expansion() {
        let chevy = KeyNormalizer::normalize(2011, "Chevy", "Volt");
        let chevrolet = KeyNormalizer::normalize(2011, "Chevrolet", "Volt");
        assert_ne!(chevy, chevrolet);
    }

    #[test]
    fn test_sources_meet_on_the_same_key() {
        let vehicle_key = volt().join_key();
        let complaint_key = complaint("1", 2011, "CHEVROLET", " VOLT ").join_key();
        assert_eq!(vehicle_key, complaint_key);
    }
}
