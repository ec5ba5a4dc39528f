//! Dash patterns of multi-point symbols.
//!
//! Some symbols are stroked with dashed lines (planned boundaries, for
//! example).  A client drawing such a symbol itself wants the dashing
//! as a 16-bit mask, one bit per fixed length of stroke.  We find out
//! by asking the renderer to draw a sample of the symbol and looking
//! at the stroke of what it draws.  Since the answer depends only on
//! the symbol, it is cached for the life of the resolver.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{event, span, Level};

use super::catalog::SymbolCatalog;
use super::controlpoints::{ControlPointDeriver, Hints, RuleMetadata};
use super::geodesy::GeoPoint;
use super::renderer::{RenderRequest, Renderer, StrokeStyle};

/// The shape drawn when sampling a symbol's stroke.
pub const QUERY_SHAPE: [GeoPoint; 6] = [
    GeoPoint::new(8.40185525443334, 38.95854638813517),
    GeoPoint::new(15.124217101733166, 36.694658205882995),
    GeoPoint::new(18.49694847529253, 40.113591379080155),
    GeoPoint::new(8.725267851897936, 42.44678226078903),
    GeoPoint::new(8.217048055882143, 40.76041657400935),
    GeoPoint::new(8.40185525443334, 38.95854638813517),
];

/// Modifiers supplied when sampling, so that symbols which need a size
/// can be drawn at all.
const QUERY_MODIFIERS: [&str; 4] = ["AM", "WIDTH", "LENGTH", "RADIUS"];
const QUERY_MODIFIER_VALUE: &str = "1000";

/// Dash arrays the renderer is known to produce, and the masks they
/// correspond to.  Synthesizing these would lose their repetition.
/// Each mask repeats its array's on/off run lengths across sixteen
/// bits, scaled down where the array is longer than sixteen units.
const KNOWN_PATTERNS: [(&[f32], u16); 6] = [
    (&[8.0, 8.0], 0xFF00),
    (&[4.0, 4.0], 0xF0F0),
    (&[2.0, 2.0], 0xCCCC),
    (&[1.0, 1.0], 0xAAAA),
    (&[12.0, 4.0], 0xFFF0),
    (&[6.0, 2.0, 2.0, 2.0], 0xFCCF),
];

/// A stroke dash mask, most significant bit first.  Zero means a solid
/// line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashPattern(u16);

impl DashPattern {
    pub const SOLID: DashPattern = DashPattern(0);

    pub const fn from_mask(mask: u16) -> DashPattern {
        DashPattern(mask)
    }

    pub fn mask(&self) -> u16 {
        self.0
    }

    pub fn is_solid(&self) -> bool {
        self.0 == 0
    }

    /// Converts an array of alternating on and off lengths.
    pub fn from_dash_array(lengths: &[f32]) -> DashPattern {
        match KNOWN_PATTERNS
            .iter()
            .find(|(known, _)| *known == lengths)
        {
            Some((_, mask)) => DashPattern(*mask),
            None => DashPattern(synthesize_mask(lengths)),
        }
    }
}

impl Display for DashPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        if self.is_solid() {
            f.write_str("solid")
        } else {
            write!(f, "{:016b}", self.0)
        }
    }
}

/// Scales a dash array into 16 bits.  Each unit of length gets the same
/// number of bits, as many as will fit; lengths are rounded up.
fn synthesize_mask(lengths: &[f32]) -> u16 {
    let total: f32 = lengths.iter().map(|l| l.ceil()).sum();
    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    let width = ((16.0 / total) as u32).clamp(1, 16);
    let on: u32 = 0xFFFF >> (16 - width);
    let mut mask: u32 = 0;
    for (i, length) in lengths.iter().enumerate() {
        let steps = (length / width as f32).ceil().max(0.0) as u32;
        for _ in 0..steps {
            mask <<= width;
            if i % 2 == 0 {
                mask |= on;
            }
            mask &= 0xFFFF;
        }
    }
    mask as u16
}

/// Works out (and remembers) the dash pattern of each symbol.
pub struct DashPatternResolver {
    catalogs: Vec<Arc<SymbolCatalog>>,
    deriver: Arc<ControlPointDeriver>,
    renderer: Arc<dyn Renderer>,
    cache: Mutex<HashMap<String, DashPattern>>,
}

impl fmt::Debug for DashPatternResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("DashPatternResolver")
            .field("catalogs", &self.catalogs)
            .field("deriver", &self.deriver)
            .finish_non_exhaustive()
    }
}

impl DashPatternResolver {
    /// Symbols are looked up in each of `catalogs` in turn.
    pub fn new(
        catalogs: Vec<Arc<SymbolCatalog>>,
        deriver: Arc<ControlPointDeriver>,
        renderer: Arc<dyn Renderer>,
    ) -> DashPatternResolver {
        DashPatternResolver {
            catalogs,
            deriver,
            renderer,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, DashPattern>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The dash pattern of the symbol with this code.  `None` means
    /// that the symbol is unknown or that the renderer failed to draw
    /// it; neither outcome is remembered.
    ///
    /// The cache is not locked while rendering, so threads which miss
    /// on the same code at the same time may each render it.  They
    /// all arrive at the same pattern, and later calls are served from
    /// the cache.
    pub fn resolve(&self, code: &str) -> Option<DashPattern> {
        if let Some(pattern) = self.cache().get(code) {
            return Some(*pattern);
        }
        let span = span!(Level::DEBUG, "resolve_dash_pattern", code=%code);
        let _enter = span.enter();

        let Some(symbol) = self.catalogs.iter().find_map(|c| c.get_symbol(code)) else {
            event!(Level::DEBUG, "no symbol {code} in the catalog");
            return None;
        };
        let mut modifiers: BTreeMap<String, String> = QUERY_MODIFIERS
            .iter()
            .map(|m| (m.to_string(), QUERY_MODIFIER_VALUE.to_string()))
            .collect();
        let derived = self.deriver.derive(
            &RuleMetadata::from(&symbol.definition),
            &QUERY_SHAPE,
            &Hints::default(),
        );
        let points: Vec<GeoPoint> = match derived {
            Some(set) => {
                modifiers.extend(set.modifiers);
                set.points
            }
            None => QUERY_SHAPE.to_vec(),
        };

        // The cache lock is not held while rendering.
        let request = RenderRequest {
            code,
            points: &points,
            modifiers: &modifiers,
            stroke: StrokeStyle::default(),
        };
        let features = match self.renderer.render_multipoint(&request) {
            Ok(features) => features,
            Err(e) => {
                event!(Level::WARN, "failed to render {code} to find its dash pattern: {e}");
                return None;
            }
        };
        let pattern = features
            .iter()
            .find_map(|f| f.dash_array.as_deref())
            .map_or(DashPattern::SOLID, DashPattern::from_dash_array);
        event!(Level::DEBUG, "dash pattern of {code} is {pattern}");
        self.cache().insert(code.to_string(), pattern);
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sidc::Generation;

    use super::*;
    use crate::renderer::{RenderError, RenderedFeature};

    #[derive(Debug, Clone)]
    struct Recorded {
        code: String,
        points: usize,
        modifiers: BTreeMap<String, String>,
        stroke: StrokeStyle,
    }

    /// Draws every symbol the same way and counts how often it is
    /// asked to.
    struct FakeRenderer {
        response: Result<Vec<RenderedFeature>, RenderError>,
        calls: AtomicUsize,
        last: Mutex<Option<Recorded>>,
    }

    impl FakeRenderer {
        fn new(response: Result<Vec<RenderedFeature>, RenderError>) -> Arc<FakeRenderer> {
            Arc::new(FakeRenderer {
                response,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn dashed(dashes: Option<Vec<f32>>) -> Arc<FakeRenderer> {
            FakeRenderer::new(Ok(vec![
                RenderedFeature {
                    points: Vec::new(),
                    dash_array: None,
                },
                RenderedFeature {
                    points: Vec::new(),
                    dash_array: dashes,
                },
                RenderedFeature {
                    points: Vec::new(),
                    dash_array: Some(vec![1.0, 1.0]),
                },
            ]))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last(&self) -> Recorded {
            self.last
                .lock()
                .expect("lock")
                .clone()
                .expect("renderer was called")
        }
    }

    impl Renderer for FakeRenderer {
        fn render_multipoint(
            &self,
            request: &RenderRequest<'_>,
        ) -> Result<Vec<RenderedFeature>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some(Recorded {
                code: request.code.to_string(),
                points: request.points.len(),
                modifiers: request.modifiers.clone(),
                stroke: request.stroke,
            });
            self.response.clone()
        }
    }

    fn resolver(renderer: Arc<FakeRenderer>) -> DashPatternResolver {
        let catalogs = [Generation::C, Generation::D]
            .into_iter()
            .map(|g| Arc::new(SymbolCatalog::builtin(g).expect("builtin catalog")))
            .collect();
        DashPatternResolver::new(catalogs, Arc::new(ControlPointDeriver::default()), renderer)
    }

    const FLOT: &str = "GFGPGLF---****X";

    #[test]
    fn test_known_patterns() {
        assert_eq!(DashPattern::from_dash_array(&[4.0, 4.0]).mask(), 0xF0F0);
        assert_eq!(DashPattern::from_dash_array(&[8.0, 8.0]).mask(), 0xFF00);
        assert_eq!(DashPattern::from_dash_array(&[6.0, 2.0, 2.0, 2.0]).mask(), 0xFCCF);
    }

    /// Lays the runs of `dashes`, one bit per unit, across sixteen
    /// bits, starting again from the first run as often as needed.
    fn tiled(dashes: &[f32]) -> u16 {
        let bits = dashes
            .iter()
            .enumerate()
            .flat_map(|(i, len)| std::iter::repeat(i % 2 == 0).take(*len as usize))
            .cycle()
            .take(16);
        bits.fold(0u16, |mask, on| (mask << 1) | u16::from(on))
    }

    #[test]
    fn test_known_patterns_repeat_their_runs() {
        for (dashes, mask) in KNOWN_PATTERNS {
            let units: f32 = dashes.iter().sum();
            if units <= 16.0 {
                assert_eq!(mask, tiled(dashes), "{dashes:?}");
            }
        }
    }

    #[test]
    fn test_synthesized_patterns() {
        // Four bits per unit.
        assert_eq!(synthesize_mask(&[3.0, 1.0]), 0x00F0);
        // Two bits per unit.
        assert_eq!(synthesize_mask(&[5.0, 3.0]), 0x03F0);
        // Lengths round up, leaving room for one bit per unit.
        assert_eq!(synthesize_mask(&[4.5, 4.0]), 0x01F0);
        // Too long to fit: one bit per unit, oldest bits shifted out.
        assert_eq!(synthesize_mask(&[10.0, 10.0]), 0xFC00);
        assert_eq!(synthesize_mask(&[1.0]), 0xFFFF);
    }

    #[test]
    fn test_degenerate_arrays_are_solid() {
        assert_eq!(synthesize_mask(&[]), 0);
        assert_eq!(synthesize_mask(&[0.0, 0.0]), 0);
        assert_eq!(synthesize_mask(&[f32::NAN, 2.0]), 0);
        assert_eq!(synthesize_mask(&[-3.0, 1.0]), 0);
        assert!(DashPattern::from_dash_array(&[]).is_solid());
    }

    #[test]
    fn test_display() {
        assert_eq!(DashPattern::SOLID.to_string(), "solid");
        assert_eq!(DashPattern::from_mask(0xF0F0).to_string(), "1111000011110000");
    }

    #[test]
    fn test_concurrent_resolves_agree() {
        let renderer = FakeRenderer::dashed(Some(vec![4.0, 4.0]));
        let r = resolver(Arc::clone(&renderer));
        let results: Vec<Option<DashPattern>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| r.resolve(FLOT))).collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("resolver thread panicked"))
                .collect()
        });
        for result in results {
            assert_eq!(result, Some(DashPattern::from_mask(0xF0F0)));
        }
        let calls = renderer.calls();
        assert!((1..=4).contains(&calls), "{calls} renders");
        assert_eq!(r.resolve(FLOT), Some(DashPattern::from_mask(0xF0F0)));
        assert_eq!(renderer.calls(), calls);
    }

    #[test]
    fn test_resolve_takes_first_dashed_feature_and_caches() {
        let renderer = FakeRenderer::dashed(Some(vec![4.0, 4.0]));
        let r = resolver(Arc::clone(&renderer));
        assert_eq!(r.resolve(FLOT), Some(DashPattern::from_mask(0xF0F0)));
        assert_eq!(r.resolve(FLOT), Some(DashPattern::from_mask(0xF0F0)));
        assert_eq!(renderer.calls(), 1);
    }

    #[test]
    fn test_undashed_symbol_is_cached_as_solid() {
        let renderer = FakeRenderer::new(Ok(vec![RenderedFeature::default()]));
        let r = resolver(Arc::clone(&renderer));
        assert_eq!(r.resolve(FLOT), Some(DashPattern::SOLID));
        assert_eq!(r.resolve(FLOT), Some(DashPattern::SOLID));
        assert_eq!(renderer.calls(), 1);
    }

    #[test]
    fn test_render_failure_is_not_cached() {
        let renderer = FakeRenderer::new(Err(RenderError::Failed("out of memory".to_string())));
        let r = resolver(Arc::clone(&renderer));
        assert_eq!(r.resolve(FLOT), None);
        assert_eq!(r.resolve(FLOT), None);
        assert_eq!(renderer.calls(), 2);
    }

    #[test]
    fn test_unknown_symbol_is_not_rendered() {
        let renderer = FakeRenderer::dashed(Some(vec![4.0, 4.0]));
        let r = resolver(Arc::clone(&renderer));
        assert_eq!(r.resolve("GFGPZZZ---****X"), None);
        assert_eq!(r.resolve("not a code"), None);
        assert_eq!(renderer.calls(), 0);
    }

    #[test]
    fn test_sample_request() {
        let renderer = FakeRenderer::dashed(None);
        let r = resolver(Arc::clone(&renderer));
        // A line is drawn through the sample shape as it is.
        assert_eq!(r.resolve(FLOT), Some(DashPattern::from_mask(0xAAAA)));
        let last = renderer.last();
        assert_eq!(last.code, FLOT);
        assert_eq!(last.points, QUERY_SHAPE.len());
        assert_eq!(last.stroke, StrokeStyle::default());
        assert_eq!(last.stroke.color, 0xFFFF_FFFF);
        for m in QUERY_MODIFIERS {
            assert_eq!(last.modifiers.get(m).map(String::as_str), Some("1000"));
        }

        // The sample shape is not a rectangle, so a block can't be
        // derived from it and the shape is used as it is.
        r.resolve("GFTPB-----****X");
        assert_eq!(renderer.last().points, QUERY_SHAPE.len());

        // A circular symbol gets its radius from the sample shape.
        r.resolve("GFFPACNC--****X");
        let last = renderer.last();
        assert_eq!(last.points, 1);
        assert_ne!(last.modifiers.get("AM").map(String::as_str), Some("1000"));
        assert_eq!(last.modifiers.get("WIDTH").map(String::as_str), Some("1000"));
    }

    #[test]
    fn test_resolve_2525d_codes() {
        let renderer = FakeRenderer::dashed(Some(vec![8.0, 8.0]));
        let r = resolver(Arc::clone(&renderer));
        assert_eq!(
            r.resolve("10032500001401000000"),
            Some(DashPattern::from_mask(0xFF00))
        );
        // A different code for the same symbol is a separate entry.
        r.resolve("10062500001401000000");
        assert_eq!(renderer.calls(), 2);
    }
}
