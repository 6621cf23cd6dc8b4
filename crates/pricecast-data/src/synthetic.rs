use crate::listing::Listing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAKERS: &[&str] = &["vw", "ford", "bmw", "audi", "toyota", "skoda"];
const MODELS: &[&str] = &[
    "golf", "focus", "320i", "a3", "corolla", "octavia", "polo", "fiesta",
];
const COLORS: &[&str] = &["black", "white", "blue", "red", "grey"];
const BODIES: &[&str] = &["hatchback", "saloon", "estate", "suv"];

fn gauss(rng: &mut StdRng) -> f64 {
    // Box-Muller
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Generate synthetic listings with a known linear price relationship:
///
/// `price = 5000 + 1000 * engine_size - 50 * mileage / 1000 + noise`
///
/// Mileage is strictly positive and prices stay positive, so generated data
/// passes the upstream filters unchanged. Useful for pipeline tests where
/// the ground truth must be recoverable.
pub fn make_listings(n: usize, noise: f64, seed: u64) -> Vec<Listing> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let engine_size = 1.0 + rng.gen::<f64>() * 2.0;
            let mileage = 1_000.0 + rng.gen::<f64>() * 79_000.0;
            let price =
                5_000.0 + 1_000.0 * engine_size - 50.0 * mileage / 1_000.0 + gauss(&mut rng) * noise;
            Listing {
                maker: MAKERS[rng.gen_range(0..MAKERS.len())].to_string(),
                model: MODELS[rng.gen_range(0..MODELS.len())].to_string(),
                color: COLORS[rng.gen_range(0..COLORS.len())].to_string(),
                reg_year: rng.gen_range(2005..=2020),
                body: BODIES[rng.gen_range(0..BODIES.len())].to_string(),
                mileage,
                engine_size,
                transmission: (if rng.gen_bool(0.6) { "manual" } else { "automatic" }).to_string(),
                fuel: (if rng.gen_bool(0.5) { "petrol" } else { "diesel" }).to_string(),
                seats: [4, 5, 7][rng.gen_range(0..3)],
                doors: [3, 4, 5][rng.gen_range(0..3)],
                ad_year: rng.gen_range(2019..=2020),
                ad_month: rng.gen_range(1..=12),
                price,
            }
        })
        .collect()
}
