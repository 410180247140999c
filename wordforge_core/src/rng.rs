use crate::generator::GeneratorError;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, SeedableRng};

/// Random source used for real candidate generation.
pub type SecureRng = ChaCha20Rng;

/// Seeds a ChaCha20 generator from the operating system entropy source.
///
/// Predictable candidates defeat the purpose of generation, so there is no
/// fallback: entropy failure is returned to the caller as
/// [`GeneratorError::Entropy`].
pub fn secure_rng() -> Result<SecureRng, GeneratorError> {
    Ok(ChaCha20Rng::try_from_rng(&mut OsRng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn secure_rng_instances_are_independent() {
        let mut first = secure_rng().expect("OS entropy should be available in tests");
        let mut second = secure_rng().expect("OS entropy should be available in tests");
        let a: [u64; 4] = std::array::from_fn(|_| first.random());
        let b: [u64; 4] = std::array::from_fn(|_| second.random());
        assert_ne!(a, b);
    }
}
