//! Placement of pre-wrapped text lines with per-character colors

use crate::backend::TextMetrics;
use crate::geometry::Point;
use crate::render::DrawCommand;
use crate::types::{Color, FontFace, TextAlign, TextColors};

/// A block of already wrapped lines to place around a center point
#[derive(Debug, Clone)]
pub struct TextRun<'a> {
    pub lines: &'a [String],
    /// Horizontal center of centered lines and vertical center of the block
    pub center: Point,
    /// Start of every line when left aligned
    pub left: f32,
    pub font: &'a FontFace,
    pub size: f32,
    /// Extra space above and below each line, relative to `size`
    pub line_spacing_ratio: f32,
    pub colors: &'a TextColors,
    pub default_color: Color,
    pub align: TextAlign,
}

impl TextRun<'_> {
    /// Distance between two consecutive baselines
    pub fn line_height<M: TextMetrics + ?Sized>(&self, metrics: &M) -> f32 {
        metrics.text_line_height(self.font, self.size) + 2.0 * self.size * self.line_spacing_ratio
    }

    /// Baseline of the first line; a single line sits on `center.y`
    pub fn first_baseline<M: TextMetrics + ?Sized>(&self, metrics: &M) -> f32 {
        match self.lines.len() {
            0 | 1 => self.center.y,
            n => self.center.y - (n - 1) as f32 * self.line_height(metrics) / 2.0,
        }
    }
}

/// One draw command per character of `run`.
///
/// Color indices count characters of the text before wrapping: each line
/// after the first skips one index for the space removed by the wrap.
pub fn layout_text_run<M: TextMetrics + ?Sized>(metrics: &M, run: &TextRun) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    if run.lines.is_empty() {
        return commands;
    }

    let line_height = run.line_height(metrics);
    let first_baseline = run.first_baseline(metrics);
    let measure = |text: &str| {
        metrics
            .measure_text_width(text, run.font, run.size)
            .unwrap_or_else(|e| {
                log::error!("Unable to calculate text width of {text:?}: {e}");
                0.0
            })
    };

    let mut char_pos = 0;
    for (j, line) in run.lines.iter().enumerate() {
        if j > 0 {
            char_pos += 1;
        }

        let mut x = match run.align {
            TextAlign::Left => run.left,
            TextAlign::Center => run.center.x - measure(line) / 2.0,
        };
        let y = first_baseline + j as f32 * line_height;

        let mut buf = [0u8; 4];
        for ch in line.chars() {
            let color = run
                .colors
                .get(&char_pos)
                .copied()
                .unwrap_or(run.default_color);
            commands.push(DrawCommand::Char {
                ch,
                position: Point::new(x, y),
                font: run.font.clone(),
                size: run.size,
                color,
            });
            x += measure(&*ch.encode_utf8(&mut buf));
            char_pos += 1;
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FixedMetrics;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn chars(commands: &[DrawCommand]) -> Vec<(char, Point, Color)> {
        commands
            .iter()
            .map(|c| match c {
                DrawCommand::Char {
                    ch,
                    position,
                    color,
                    ..
                } => (*ch, *position, *color),
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    fn run<'a>(
        lines: &'a [String],
        colors: &'a TextColors,
        font: &'a FontFace,
        align: TextAlign,
    ) -> TextRun<'a> {
        TextRun {
            lines,
            center: Point::new(100.0, 50.0),
            left: 10.0,
            font,
            size: 10.0,
            line_spacing_ratio: 0.0,
            colors,
            default_color: Color::BLACK,
            align,
        }
    }

    #[test]
    fn test_color_index_skips_wrapped_space() {
        // "AB CD" wrapped as ["AB", "CD"]
        let metrics = FixedMetrics::default();
        let text = lines(&["AB", "CD"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::from([(0, Color::RED), (3, Color::BLUE)]);
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Center),
        ));

        let got: Vec<(char, Color)> = placed.iter().map(|(c, _, col)| (*c, *col)).collect();
        assert_eq!(
            got,
            vec![
                ('A', Color::RED),
                ('B', Color::BLACK),
                ('C', Color::BLUE),
                ('D', Color::BLACK),
            ]
        );
    }

    #[test]
    fn test_only_first_character_colored() {
        let metrics = FixedMetrics::default();
        let text = lines(&["AB", "CD"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::from([(0, Color::RED)]);
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Center),
        ));
        let red = placed.iter().filter(|(_, _, c)| *c == Color::RED).count();
        assert_eq!(red, 1);
        assert_eq!(placed[0].2, Color::RED);
    }

    #[test]
    fn test_single_line_centered() {
        // 5pt per character at size 10
        let metrics = FixedMetrics::default();
        let text = lines(&["abcd"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::new();
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Center),
        ));
        let xs: Vec<f32> = placed.iter().map(|(_, p, _)| p.x).collect();
        assert_eq!(xs, vec![90.0, 95.0, 100.0, 105.0]);
        assert!(placed.iter().all(|(_, p, _)| p.y == 50.0));
    }

    #[test]
    fn test_lines_center_independently() {
        let metrics = FixedMetrics::default();
        let text = lines(&["abcd", "ab"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::new();
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Center),
        ));
        assert_eq!(placed[0].1.x, 90.0);
        assert_eq!(placed[4].1.x, 95.0);
    }

    #[test]
    fn test_left_alignment_uses_left_edge() {
        let metrics = FixedMetrics::default();
        let text = lines(&["abcd", "ab"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::new();
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Left),
        ));
        assert_eq!(placed[0].1.x, 10.0);
        assert_eq!(placed[4].1.x, 10.0);
        assert_eq!(placed[5].1.x, 15.0);
    }

    #[test]
    fn test_block_vertically_centered() {
        // line height = 0.7 * 10 + 2 * 10 * 0.3 = 13
        let metrics = FixedMetrics::default();
        let text = lines(&["a", "b", "c"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::new();
        let mut text_run = run(&text, &colors, &font, TextAlign::Center);
        text_run.line_spacing_ratio = 0.3;
        assert!((text_run.line_height(&metrics) - 13.0).abs() < 1e-4);

        let placed = chars(&layout_text_run(&metrics, &text_run));
        let ys: Vec<f32> = placed.iter().map(|(_, p, _)| p.y).collect();
        assert!((ys[0] - 37.0).abs() < 1e-4);
        assert!((ys[1] - 50.0).abs() < 1e-4);
        assert!((ys[2] - 63.0).abs() < 1e-4);
    }

    #[test]
    fn test_measure_failure_counts_as_zero_width() {
        let metrics = FixedMetrics {
            failing_measure: true,
            ..Default::default()
        };
        let text = lines(&["abc", "de"]);
        let font = FontFace::Helvetica;
        let colors = TextColors::from([(4, Color::RED)]);
        let placed = chars(&layout_text_run(
            &metrics,
            &run(&text, &colors, &font, TextAlign::Center),
        ));

        assert_eq!(placed.len(), 5);
        assert!(placed.iter().all(|(_, p, _)| p.x == 100.0));
        assert_eq!(placed[3].0, 'd');
        assert_eq!(placed[3].2, Color::RED);
    }

    #[test]
    fn test_empty_lines_produce_nothing() {
        let metrics = FixedMetrics::default();
        let font = FontFace::Helvetica;
        let colors = TextColors::new();
        assert!(layout_text_run(&metrics, &run(&[], &colors, &font, TextAlign::Center)).is_empty());
        let text = lines(&[""]);
        assert!(
            layout_text_run(&metrics, &run(&text, &colors, &font, TextAlign::Center)).is_empty()
        );
    }
}
