//! Fixture generator: randomized valid field values for request payloads.
//! The contract is length, alphabet and bound only; nothing here aims to be
//! a realistic data model of markets or addresses.

use rand::{rngs::StdRng, Rng, SeedableRng};

const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DIGITS: &[u8] = b"0123456789";

const WORDS: &[&str] = &[
    "feira", "mercado", "padaria", "acougue", "quitanda", "esquina", "bairro", "centro",
    "armazem", "emporio",
];

const LOGRADOUROS: &[&str] = &["Rua", "Avenida", "Travessa", "Alameda", "Praca"];

const NOMES_DE_RUA: &[&str] = &[
    "das Flores",
    "do Comercio",
    "Sete de Setembro",
    "das Laranjeiras",
    "Santa Clara",
    "do Mercado",
    "Quinze de Novembro",
];

pub struct Fixture {
    rng: StdRng,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture::new()
    }
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Fixture {
        Fixture {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample(&mut self, alphabet: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| alphabet[self.rng.gen_range(0..alphabet.len())] as char)
            .collect()
    }

    /// Random letters-only string of exactly `len` characters.
    pub fn alpha(&mut self, len: usize) -> String {
        self.sample(ALPHA, len)
    }

    /// Random alphanumeric string of exactly `len` characters.
    pub fn alphanumeric(&mut self, len: usize) -> String {
        self.sample(ALPHANUMERIC, len)
    }

    /// Random digit string of exactly `len` digits. Leading zeros are fine;
    /// the contract is the digit count, as with a CNPJ.
    pub fn numeric(&mut self, len: usize) -> String {
        self.sample(DIGITS, len)
    }

    /// Bounded random integer in `0..=max`.
    pub fn int(&mut self, max: i64) -> i64 {
        self.rng.gen_range(0..=max)
    }

    /// Free-text phrase of `n` words.
    pub fn words(&mut self, n: usize) -> String {
        (0..n)
            .map(|_| WORDS[self.rng.gen_range(0..WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A street address line.
    pub fn street_address(&mut self) -> String {
        let logradouro = LOGRADOUROS[self.rng.gen_range(0..LOGRADOUROS.len())];
        let nome = NOMES_DE_RUA[self.rng.gen_range(0..NOMES_DE_RUA.len())];
        let numero = self.rng.gen_range(1..2000);
        format!("{logradouro} {nome}, {numero}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(14)]
    #[test_case(50)]
    #[test_case(56)]
    fn generated_strings_have_the_requested_length(len: usize) {
        let mut fx = Fixture::new();
        assert_eq!(fx.alpha(len).chars().count(), len);
        assert_eq!(fx.alphanumeric(len).chars().count(), len);
        assert_eq!(fx.numeric(len).chars().count(), len);
    }

    #[test]
    fn alpha_contains_letters_only() {
        let mut fx = Fixture::new();
        assert!(fx.alpha(200).chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn numeric_contains_digits_only() {
        let mut fx = Fixture::new();
        assert!(fx.numeric(200).chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn int_respects_the_bound() {
        let mut fx = Fixture::new();
        for _ in 0..1000 {
            let v = fx.int(15);
            assert!((0..=15).contains(&v), "out of bounds: {v}");
        }
    }

    #[test]
    fn words_produces_the_requested_word_count() {
        let mut fx = Fixture::new();
        assert_eq!(fx.words(3).split(' ').count(), 3);
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        let mut a = Fixture::seeded(42);
        let mut b = Fixture::seeded(42);
        assert_eq!(a.alphanumeric(32), b.alphanumeric(32));
        assert_eq!(a.street_address(), b.street_address());
        assert_eq!(a.int(100), b.int(100));
    }
}
