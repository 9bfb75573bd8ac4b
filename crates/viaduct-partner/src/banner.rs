//! Banner sizes and the static best-fit table.

use serde::{Deserialize, Serialize};

/// A banner display size in density-independent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerSize {
    /// Width in points.
    pub width: u32,
    /// Height in points.
    pub height: u32,
}

/// Standard banner, 320x50.
pub const BANNER: BannerSize = BannerSize {
    width: 320,
    height: 50,
};

/// Leaderboard, 728x90.
pub const LEADERBOARD: BannerSize = BannerSize {
    width: 728,
    height: 90,
};

/// Medium rectangle, 300x250.
pub const MEDIUM_RECT: BannerSize = BannerSize {
    width: 300,
    height: 250,
};

/// The sizes the partner can actually serve.
pub const STANDARD_SIZES: [BannerSize; 3] = [BANNER, LEADERBOARD, MEDIUM_RECT];

impl BannerSize {
    /// Area in square points, used as the best-fit tiebreaker.
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether `self` fits entirely inside `container`.
    #[must_use]
    pub const fn fits_in(self, container: BannerSize) -> bool {
        self.width <= container.width && self.height <= container.height
    }

    /// Best-fit lookup against the standard table: the largest standard size
    /// that fits inside the requested rect, `None` when nothing does.
    #[must_use]
    pub fn fit(requested: BannerSize) -> Option<BannerSize> {
        STANDARD_SIZES
            .iter()
            .copied()
            .filter(|size| size.fits_in(requested))
            .max_by_key(|size| size.area())
    }
}

impl std::fmt::Display for BannerSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_standard_sizes_fit_themselves() {
        for size in STANDARD_SIZES {
            assert_eq!(BannerSize::fit(size), Some(size));
        }
    }

    #[test]
    fn too_small_request_has_no_fit() {
        let tiny = BannerSize {
            width: 100,
            height: 20,
        };
        assert_eq!(BannerSize::fit(tiny), None);
    }

    #[test]
    fn oversize_request_picks_the_largest_fit() {
        let huge = BannerSize {
            width: 1024,
            height: 768,
        };
        // 300x250 carries the largest area in the table.
        assert_eq!(BannerSize::fit(huge), Some(MEDIUM_RECT));
    }

    #[test]
    fn wide_but_short_request_prefers_leaderboard() {
        let wide = BannerSize {
            width: 800,
            height: 100,
        };
        assert_eq!(BannerSize::fit(wide), Some(LEADERBOARD));
    }

    #[test]
    fn fit_never_exceeds_the_request() {
        let request = BannerSize {
            width: 350,
            height: 60,
        };
        let fitted = BannerSize::fit(request).unwrap();
        assert!(fitted.fits_in(request));
        assert_eq!(fitted, BANNER);
    }

    #[test]
    fn display_is_width_by_height() {
        assert_eq!(BANNER.to_string(), "320x50");
    }
}
