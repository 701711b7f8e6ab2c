//! Deterministic scenario generation.
//!
//! A [`ScenarioGenerator`] turns one seeded [`RandomDataGenerator`] into a
//! stream of fill commands with their styles. For every command the random
//! values are consumed in a fixed order:
//!
//! 1. the style category, only when the configured style is `random`
//! 2. the command geometry
//! 3. the style object
//!
//! Reseeding therefore replays the same sequence, and the first `k` scenarios
//! of any run are the same regardless of how many follow.

use raster_pipe::{BoxD, Command, Gradient, PointD, Style, TextRun};

use crate::options::{FuzzerCommand, FuzzerStyle};
use crate::random::RandomDataGenerator;

/// Distance generated geometry may reach beyond the canvas edges.
pub const OUT_OF_BOUNDS: f64 = 30.0;

/// Points of a `fill-poly-10` polygon.
pub const POLYGON_POINT_COUNT: usize = 10;

pub const TEXT_FONT_SIZE: f64 = 20.0;

/// Symbols text runs are built from.
pub const TEXT_ALPHABET: &[u8; 86] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-={}[]:;<>?|";

/// One generated fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Concrete style category the style was drawn from.
    pub category: FuzzerStyle,
    pub command: Command,
    pub style: Style,
}

/// Seeded producer of [`Scenario`]s for one command and style category.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    rnd: RandomDataGenerator,
    command: FuzzerCommand,
    style: FuzzerStyle,
}

impl ScenarioGenerator {
    /// Generator for a `width` x `height` canvas, producing `fill-rect-i`
    /// with solid colors until configured otherwise.
    pub fn new(width: u32, height: u32) -> Self {
        let bounds = BoxD::new(
            -OUT_OF_BOUNDS,
            -OUT_OF_BOUNDS,
            width as f64 + OUT_OF_BOUNDS,
            height as f64 + OUT_OF_BOUNDS,
        );
        Self {
            rnd: RandomDataGenerator::new(bounds),
            command: FuzzerCommand::FillRectI,
            style: FuzzerStyle::Solid,
        }
    }

    pub fn bounds(&self) -> BoxD {
        self.rnd.bounds()
    }

    pub fn command(&self) -> FuzzerCommand {
        self.command
    }

    pub fn style(&self) -> FuzzerStyle {
        self.style
    }

    /// Panics on [`FuzzerCommand::All`]: a generator produces one category.
    pub fn configure(&mut self, command: FuzzerCommand, style: FuzzerStyle) {
        assert!(
            command != FuzzerCommand::All,
            "a scenario generator needs a concrete command category"
        );
        self.command = command;
        self.style = style;
    }

    pub fn seed(&mut self, seed: u64) {
        self.rnd.seed(seed);
    }

    /// The next scenario.
    pub fn next_scenario(&mut self) -> Scenario {
        let category = self.next_style_category();
        let command = self.next_command();
        let style = self.next_style(category);
        Scenario {
            category,
            command,
            style,
        }
    }

    /// The next `count` scenarios, generated lazily.
    pub fn scenarios(&mut self, count: usize) -> impl Iterator<Item = Scenario> + '_ {
        (0..count).map(move |_| self.next_scenario())
    }

    fn next_style_category(&mut self) -> FuzzerStyle {
        match self.style {
            FuzzerStyle::Random => FuzzerStyle::from_random(self.rnd.next_u32()),
            style => style,
        }
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    fn next_command(&mut self) -> Command {
        let rnd = &mut self.rnd;
        match self.command {
            FuzzerCommand::FillRectI | FuzzerCommand::All => Command::FillRectI(rnd.next_rect_i()),
            FuzzerCommand::FillRectD => Command::FillRectD(rnd.next_rect_d()),
            FuzzerCommand::FillTriangle => Command::FillTriangle(rnd.next_triangle()),
            FuzzerCommand::FillPoly10 => Command::FillPolygon(
                (0..POLYGON_POINT_COUNT).map(|_| rnd.next_point_d()).collect(),
            ),
            FuzzerCommand::FillPathQuad => {
                Command::FillPathQuad([rnd.next_point_d(), rnd.next_point_d(), rnd.next_point_d()])
            }
            FuzzerCommand::FillPathCubic => Command::FillPathCubic([
                rnd.next_point_d(),
                rnd.next_point_d(),
                rnd.next_point_d(),
                rnd.next_point_d(),
            ]),
            FuzzerCommand::FillText => {
                let r0 = rnd.next_u32();
                let r1 = rnd.next_u32();
                let pt0 = rnd.next_point_d();
                let pt1 = rnd.next_point_d();
                Command::FillText {
                    font_size: TEXT_FONT_SIZE,
                    runs: vec![
                        TextRun {
                            origin: pt0,
                            text: text_from_bits(r0),
                        },
                        TextRun {
                            origin: pt1,
                            text: text_from_bits(r1),
                        },
                    ],
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------------

    fn next_style(&mut self, category: FuzzerStyle) -> Style {
        let rnd = &mut self.rnd;
        match category {
            FuzzerStyle::SolidOpaque => Style::Solid(rnd.next_rgb32()),

            FuzzerStyle::GradientLinear | FuzzerStyle::GradientLinearDither => {
                let p0 = rnd.next_point_d();
                let p1 = rnd.next_point_d();
                let mut gradient = Gradient::linear(p0.x, p0.y, p1.x, p1.y);
                gradient
                    .add_stop(0.0, rnd.next_rgba32())
                    .add_stop(0.5, rnd.next_rgba32())
                    .add_stop(1.0, rnd.next_rgba32())
                    .set_extend_mode(rnd.next_extend_mode());
                Style::Gradient(gradient)
            }

            FuzzerStyle::GradientRadial | FuzzerStyle::GradientRadialDither => {
                // Integer inputs keep the focal geometry exactly representable.
                let rad = (rnd.next_double() * 500.0 + 20.0).floor();
                let dist = (rnd.next_double() * (rad - 10.0)).floor();
                let angle = rnd.next_double() * std::f64::consts::PI;
                let center = rnd.next_point_i();
                let focal = center
                    + PointD::new((-angle.sin() * dist).floor(), (angle.cos() * dist).floor());

                let mut gradient = Gradient::radial(center.x, center.y, focal.x, focal.y, rad);
                let c = rnd.next_rgba32();
                gradient
                    .add_stop(0.0, c)
                    .add_stop(0.5, rnd.next_rgba32())
                    .add_stop(1.0, c)
                    .set_extend_mode(rnd.next_extend_mode());
                Style::Gradient(gradient)
            }

            FuzzerStyle::GradientConic | FuzzerStyle::GradientConicDither => {
                let center = rnd.next_point_i();
                let angle = rnd.next_double() * std::f64::consts::PI;
                let mut gradient = Gradient::conic(center.x, center.y, angle);
                gradient
                    .add_stop(0.0, rnd.next_rgba32())
                    .add_stop(0.33, rnd.next_rgba32())
                    .add_stop(0.66, rnd.next_rgba32())
                    .add_stop(1.0, rnd.next_rgba32());
                Style::Gradient(gradient)
            }

            // Patterns are not rendered yet and fall back to a solid color.
            FuzzerStyle::Solid
            | FuzzerStyle::PatternAligned
            | FuzzerStyle::PatternUnaligned
            | FuzzerStyle::PatternAffine
            | FuzzerStyle::Random => Style::Solid(rnd.next_rgba32()),
        }
    }
}

/// Four symbols, one per byte of `bits`, lowest byte first.
fn text_from_bits(bits: u32) -> String {
    (0..4)
        .map(|i| {
            let byte = (bits >> (8 * i)) & 0xFF;
            TEXT_ALPHABET[(byte as usize) % TEXT_ALPHABET.len()] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_pipe::GradientKind;

    fn generator(command: FuzzerCommand, style: FuzzerStyle, seed: u64) -> ScenarioGenerator {
        let mut gen = ScenarioGenerator::new(513, 513);
        gen.configure(command, style);
        gen.seed(seed);
        gen
    }

    #[test]
    fn test_bounds_extend_past_canvas() {
        let gen = ScenarioGenerator::new(100, 50);
        assert_eq!(gen.bounds(), BoxD::new(-30.0, -30.0, 130.0, 80.0));
    }

    #[test]
    fn test_prefix_determinism() {
        for command in FuzzerCommand::CATEGORIES {
            let long: Vec<Scenario> = generator(command, FuzzerStyle::Random, 11).scenarios(40).collect();
            let short: Vec<Scenario> = generator(command, FuzzerStyle::Random, 11).scenarios(15).collect();
            assert_eq!(&long[..15], &short[..], "{}", command);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a: Vec<Scenario> = generator(FuzzerCommand::FillTriangle, FuzzerStyle::Solid, 1)
            .scenarios(5)
            .collect();
        let b: Vec<Scenario> = generator(FuzzerCommand::FillTriangle, FuzzerStyle::Solid, 2)
            .scenarios(5)
            .collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_command_shapes() {
        let mut gen = generator(FuzzerCommand::FillPoly10, FuzzerStyle::Solid, 1);
        match gen.next_scenario().command {
            Command::FillPolygon(pts) => assert_eq!(pts.len(), POLYGON_POINT_COUNT),
            other => panic!("unexpected command {}", other),
        }

        let mut gen = generator(FuzzerCommand::FillText, FuzzerStyle::Solid, 1);
        match gen.next_scenario().command {
            Command::FillText { font_size, runs } => {
                assert_eq!(font_size, TEXT_FONT_SIZE);
                assert_eq!(runs.len(), 2);
                for run in runs {
                    assert_eq!(run.text.len(), 4);
                    assert!(run.text.bytes().all(|b| TEXT_ALPHABET.contains(&b)));
                }
            }
            other => panic!("unexpected command {}", other),
        }
    }

    #[test]
    fn test_fixed_category_is_kept() {
        let mut gen = generator(FuzzerCommand::FillRectD, FuzzerStyle::GradientConicDither, 3);
        for s in gen.scenarios(20) {
            assert_eq!(s.category, FuzzerStyle::GradientConicDither);
            match s.style {
                Style::Gradient(g) => {
                    assert!(matches!(g.kind(), GradientKind::Conic { .. }));
                    assert_eq!(g.stops().len(), 4);
                }
                other => panic!("unexpected style {}", other),
            }
        }
    }

    #[test]
    fn test_random_category_is_concrete() {
        let mut gen = generator(FuzzerCommand::FillRectI, FuzzerStyle::Random, 7);
        for s in gen.scenarios(200) {
            assert_ne!(s.category, FuzzerStyle::Random);
        }
    }

    #[test]
    fn test_radial_stops_repeat_first_color() {
        let mut gen = generator(FuzzerCommand::FillRectI, FuzzerStyle::GradientRadial, 5);
        for s in gen.scenarios(20) {
            match s.style {
                Style::Gradient(g) => {
                    let stops = g.stops();
                    assert_eq!(stops.len(), 3);
                    assert_eq!(stops[0].color, stops[2].color);
                    if let &GradientKind::Radial { cx, cy, fx, fy, r } = g.kind() {
                        assert_eq!(cx, cx.floor());
                        assert_eq!(fy, fy.floor());
                        assert!(r >= 20.0 && r < 520.0);
                        assert!((fx - cx).hypot(fy - cy) <= r);
                    } else {
                        panic!("expected a radial gradient");
                    }
                }
                other => panic!("unexpected style {}", other),
            }
        }
    }

    #[test]
    fn test_text_from_bits() {
        assert_eq!(text_from_bits(0), "AAAA");
        assert_eq!(text_from_bits(0x0000_0001), "BAAA");
        // 86 wraps back to the start of the alphabet.
        assert_eq!(text_from_bits(86 << 8), "AAAA");
        assert_eq!(text_from_bits(85), "|AAA");
    }

    #[test]
    #[should_panic]
    fn test_all_is_not_a_category() {
        ScenarioGenerator::new(10, 10).configure(FuzzerCommand::All, FuzzerStyle::Solid);
    }
}
