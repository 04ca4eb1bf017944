//! Placement of the signature image on a page

use serde::{Deserialize, Serialize};

/// Scale applied to the signature's native pixel dimensions
pub const SIGNATURE_SCALE: f64 = 0.5;

/// Width and height in PDF units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Drawing rectangle in PDF user space (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Center `image` on `page`. Coordinates go negative when the image is
    /// larger than the page; they are not clamped.
    pub fn centered(page: Dimensions, image: Dimensions) -> Self {
        Self {
            x: page.width / 2.0 - image.width / 2.0,
            y: page.height / 2.0 - image.height / 2.0,
            width: image.width,
            height: image.height,
        }
    }

    /// True when the whole rectangle lies on the page
    pub fn is_within(&self, page: Dimensions) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= page.width
            && self.y + self.height <= page.height
    }

    /// Approximate equality for placements read back from a content stream
    pub fn approx_eq(&self, other: &Placement, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const LETTER: Dimensions = Dimensions {
        width: 612.0,
        height: 792.0,
    };

    #[test]
    fn test_letter_page_centering() {
        let image = Dimensions::new(400.0, 200.0).scale(SIGNATURE_SCALE);
        let placement = Placement::centered(LETTER, image);
        assert_eq!(
            placement,
            Placement {
                x: 206.0,
                y: 346.0,
                width: 200.0,
                height: 100.0,
            }
        );
        assert!(placement.is_within(LETTER));
    }

    #[test]
    fn test_oversized_image_goes_negative() {
        let image = Dimensions::new(2000.0, 2000.0).scale(SIGNATURE_SCALE);
        let placement = Placement::centered(LETTER, image);
        assert_eq!(placement.x, -194.0);
        assert_eq!(placement.y, -104.0);
        assert!(!placement.is_within(LETTER));
    }

    proptest! {
        /// Property: on a 612x792 page, x = 306 - w/4 and y = 396 - h/4
        #[test]
        fn letter_placement_matches_quarter_formula(
            w in 1u32..4000,
            h in 1u32..4000,
        ) {
            let image = Dimensions::new(w as f64, h as f64).scale(SIGNATURE_SCALE);
            let placement = Placement::centered(LETTER, image);
            prop_assert!((placement.x - (306.0 - w as f64 / 4.0)).abs() < 1e-9);
            prop_assert!((placement.y - (396.0 - h as f64 / 4.0)).abs() < 1e-9);
        }

        /// Property: the placement's center is the page's center
        #[test]
        fn placement_center_is_page_center(
            pw in 1.0f64..5000.0,
            ph in 1.0f64..5000.0,
            iw in 0.0f64..5000.0,
            ih in 0.0f64..5000.0,
        ) {
            let p = Placement::centered(Dimensions::new(pw, ph), Dimensions::new(iw, ih));
            prop_assert!((p.x + p.width / 2.0 - pw / 2.0).abs() < 1e-6);
            prop_assert!((p.y + p.height / 2.0 - ph / 2.0).abs() < 1e-6);
        }

        /// Property: an image no larger than the page always fits
        #[test]
        fn smaller_image_is_within_page(
            pw in 10.0f64..2000.0,
            ph in 10.0f64..2000.0,
            frac_w in 0.0f64..=1.0,
            frac_h in 0.0f64..=1.0,
        ) {
            let page = Dimensions::new(pw, ph);
            let p = Placement::centered(page, Dimensions::new(pw * frac_w, ph * frac_h));
            prop_assert!(p.is_within(page));
        }
    }
}
