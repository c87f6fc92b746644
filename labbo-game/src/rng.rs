//! Seeded random streams shared by every subsystem that rolls dice.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R: SeedableRng> CountingRng<R> {
    fn new(seed: u64) -> Self {
        Self {
            rng: R::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Independent random streams derived from one user-visible seed.
///
/// Combat rolls, exploration loot and deck shuffles never share a stream, so
/// adding a roll to one subsystem does not shift the outcomes of another.
#[derive(Debug)]
pub struct RngBundle {
    seed: u64,
    combat: RefCell<CountingRng<SmallRng>>,
    loot: RefCell<CountingRng<SmallRng>>,
    deck: RefCell<CountingRng<ChaCha20Rng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            combat: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"combat"))),
            loot: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"loot"))),
            deck: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"deck"))),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Access the combat RNG stream (damage rolls, telegraphs, burn).
    #[must_use]
    pub fn combat(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.combat.borrow_mut()
    }

    /// Access the exploration loot stream.
    #[must_use]
    pub fn loot(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.loot.borrow_mut()
    }

    /// Access the deck stream used when a run is (re)dealt.
    #[must_use]
    pub fn deck(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.deck.borrow_mut()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
