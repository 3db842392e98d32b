//! Источники когерентного шума.
//!
//! Реализация выбирается вызывающей стороной при создании генератора:
//! - [`CoherentNoise`] — OpenSimplex2 из `fastnoise-lite`
//! - [`HashNoise`] — детерминированный value noise на целочисленном хеше

use fastnoise_lite::{FastNoiseLite, NoiseType};
use std::fmt;

/// Двумерный гладкий шум.
///
/// `sample` возвращает значение в [-1, 1], непрерывное по (x, y) при фиксированном масштабе.
pub trait NoiseProvider: Send + Sync {
    /// Пересеять источник; вызывается в начале каждой попытки генерации
    fn reseed(&mut self, seed: u64);

    fn sample(&self, x: f32, y: f32, scale: f32) -> f32;

    /// Две октавы: `base + 0.3 × detail`, где detail в четыре раза мельче
    fn layered(&self, x: f32, y: f32, scale: f32) -> f32 {
        self.sample(x, y, scale) + 0.3 * self.sample(x + 101.3, y - 57.9, scale * 4.0)
    }
}

/// OpenSimplex2 через `fastnoise-lite`
pub struct CoherentNoise {
    noise: FastNoiseLite,
    seed: u64,
}

impl CoherentNoise {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut provider = Self {
            noise: FastNoiseLite::new(),
            seed,
        };
        provider.reseed(seed);
        provider
    }
}

impl Default for CoherentNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for CoherentNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoherentNoise")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl NoiseProvider for CoherentNoise {
    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.noise = FastNoiseLite::new();
        // fastnoise принимает только i32: сворачиваем обе половины сида
        self.noise.set_seed(Some((seed ^ (seed >> 32)) as i32));
        self.noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        // Частоту задаём масштабом координат в `sample`
        self.noise.set_frequency(Some(1.0));
    }

    fn sample(&self, x: f32, y: f32, scale: f32) -> f32 {
        self.noise.get_noise_2d(x * scale, y * scale).clamp(-1.0, 1.0)
    }
}

/// Value noise на решётке с хешем вершин и smoothstep-интерполяцией
#[derive(Debug, Clone, Default)]
pub struct HashNoise {
    seed: u32,
}

impl HashNoise {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut provider = Self::default();
        provider.reseed(seed);
        provider
    }

    fn lattice(&self, x: i32, y: i32) -> f32 {
        let h = lattice_hash(x as u32 ^ self.seed, y as u32 ^ self.seed.rotate_left(16));
        (h & 0xFFFF) as f32 / 65535.0 * 2.0 - 1.0
    }
}

impl NoiseProvider for HashNoise {
    fn reseed(&mut self, seed: u64) {
        self.seed = lattice_hash(seed as u32, (seed >> 32) as u32);
    }

    fn sample(&self, x: f32, y: f32, scale: f32) -> f32 {
        let (sx, sy) = (x * scale, y * scale);
        let (x0, y0) = (sx.floor(), sy.floor());
        let (tx, ty) = (smoothstep(sx - x0), smoothstep(sy - y0));
        let (ix, iy) = (x0 as i32, y0 as i32);

        let top = lerp(self.lattice(ix, iy), self.lattice(ix + 1, iy), tx);
        let bottom = lerp(self.lattice(ix, iy + 1), self.lattice(ix + 1, iy + 1), tx);
        lerp(top, bottom, ty)
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lattice_hash(x: u32, y: u32) -> u32 {
    let mut n = x;
    n = n.wrapping_mul(0x6C8E_9CF5) ^ y.wrapping_mul(0xB529_7A4D);
    n ^= n >> 13;
    n = n.wrapping_mul(0x68E3_1DA4);
    n ^= n >> 11;
    n = n.wrapping_mul(0x1B56_C4E9);
    n ^ (n >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_smooth(noise: &dyn NoiseProvider) {
        let scale = 0.1;
        for i in 0..200 {
            let x = i as f32 * 0.37;
            let a = noise.sample(x, 3.0, scale);
            let b = noise.sample(x + 0.01, 3.0, scale);
            assert!((-1.0..=1.0).contains(&a));
            assert!((a - b).abs() < 0.05, "jump at x={x}: {a} vs {b}");
        }
    }

    #[test]
    fn hash_noise_is_continuous_and_bounded() {
        assert_smooth(&HashNoise::new(99));
    }

    #[test]
    fn coherent_noise_is_continuous_and_bounded() {
        assert_smooth(&CoherentNoise::new(99));
    }

    #[test]
    fn reseed_is_deterministic() {
        let a = HashNoise::new(5);
        let mut b = HashNoise::new(6);
        b.reseed(5);
        for i in 0..50 {
            let (x, y) = (i as f32 * 1.7, i as f32 * 0.3);
            assert_eq!(a.sample(x, y, 0.2).to_bits(), b.sample(x, y, 0.2).to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = HashNoise::new(1);
        let b = HashNoise::new(2);
        let differs = (0..50).any(|i| {
            let x = i as f32 * 2.3;
            a.sample(x, x, 0.5) != b.sample(x, x, 0.5)
        });
        assert!(differs);
    }
}
