use super::{DrawCommand, RenderContext, RenderedPage};
use crate::backend::{ImageMetrics, TextMetrics};
use crate::constants::DEFAULT_LINE_SPACING_RATIO;
use crate::geometry::{CellFrame, Point, Rect};
use crate::layout::{Page, PageMode, TextRun, fit_image, layout_text_run};
use crate::types::{FontFace, TextAlign};

/// Draw commands of one page: cut lines first, then each cell in order
pub fn render_page<M: TextMetrics + ImageMetrics + ?Sized>(
    ctx: &RenderContext,
    page: &Page,
    metrics: &M,
) -> RenderedPage {
    let mut commands = Vec::new();
    if ctx.cut_lines {
        commands.extend(ctx.layout.cut_lines(page.transform.offset));
    }

    for cell in &page.cells {
        match page.mode {
            PageMode::Pictos => {
                commands.push(DrawCommand::Rect { rect: cell.rect });
                picto_cell(ctx, cell, metrics, &mut commands);
            }
            PageMode::Definitions => {
                if definition_borders(ctx, cell) {
                    commands.push(DrawCommand::Rect { rect: cell.rect });
                }
                definition_cell(ctx, cell, metrics, &mut commands);
            }
        }
    }

    RenderedPage {
        index: page.index,
        sheet: page.sheet,
        mode: page.mode,
        size: ctx.layout.page_size,
        commands,
    }
}

fn definition_borders(ctx: &RenderContext, cell: &CellFrame) -> bool {
    let entry_borders = cell
        .entry
        .definition
        .as_ref()
        .and_then(|def| def.borders)
        .unwrap_or(false);
    ctx.text.definitions.borders.unwrap_or(false) || entry_borders
}

/// Image with its caption below (or above) it
fn picto_cell<M: TextMetrics + ImageMetrics + ?Sized>(
    ctx: &RenderContext,
    cell: &CellFrame,
    metrics: &M,
    commands: &mut Vec<DrawCommand>,
) {
    let rect = cell.rect;
    let entry = cell.entry;
    let paddings = &ctx.grid.paddings;
    let font = &ctx.text.font;
    let size = ctx.caption_font_size;

    let band = rect.height * ctx.text.size_ratio;
    let text_height = metrics.text_line_height(font, size);
    let (text_offset, image_offset) = if ctx.text.top_aligned {
        (text_height + paddings.top, band + paddings.top)
    } else {
        (
            rect.height - band / 2.0 + text_height / 2.0 - paddings.bottom,
            paddings.top,
        )
    };

    let fitted = metrics
        .image_size(&entry.image)
        .and_then(|image| fit_image(image, rect.size(), band, paddings));
    match fitted {
        Ok(image) if image.width > 0.0 && image.height > 0.0 => {
            commands.push(DrawCommand::Image {
                path: entry.image.clone(),
                rect: Rect::new(
                    rect.x + (rect.width - image.width) / 2.0,
                    rect.y + image_offset,
                    image.width,
                    image.height,
                ),
            });
        }
        Ok(_) => log::warn!("No room left for image {}", entry.image.display()),
        Err(e) => log::error!("Problem placing image of cell {}: {e}", cell.index),
    }

    let caption = [entry.text.clone()];
    commands.extend(layout_text_run(
        metrics,
        &TextRun {
            lines: &caption,
            center: Point::new(rect.center_x(), rect.y + text_offset),
            left: rect.x,
            font,
            size,
            line_spacing_ratio: 0.0,
            colors: &entry.text_colors,
            default_color: ctx.text.color,
            align: TextAlign::Center,
        },
    ));
}

/// Wrapped definition text centered in the cell
fn definition_cell<M: TextMetrics + ?Sized>(
    ctx: &RenderContext,
    cell: &CellFrame,
    metrics: &M,
    commands: &mut Vec<DrawCommand>,
) {
    let Some(def) = cell.entry.definition.as_ref().filter(|def| !def.is_blank()) else {
        return;
    };
    let defaults = &ctx.text.definitions;
    let paddings = &ctx.grid.paddings;

    let size = def.size.or(defaults.size).unwrap_or(ctx.caption_font_size);
    let font = def
        .font
        .as_ref()
        .or(defaults.font.as_ref())
        .map(|path| FontFace::File(path.clone()))
        .unwrap_or_else(|| ctx.text.font.clone());
    let color = def.color.or(defaults.color).unwrap_or(ctx.text.color);
    let line_spacing_ratio = def
        .line_spacing_ratio
        .or(defaults.line_spacing_ratio)
        .unwrap_or(DEFAULT_LINE_SPACING_RATIO);
    let align = def.align.or(defaults.align).unwrap_or_default();

    let lines = metrics
        .wrap_text(
            &def.text,
            &font,
            size,
            cell.rect.width - paddings.left_right(),
        )
        .unwrap_or_else(|e| {
            log::error!("Unable to word wrap text: {e}");
            vec![def.text.clone()]
        });

    if line_spacing_ratio == 0.0 && lines.len() > 1 {
        let preview: String = def.text.chars().take(30).collect();
        log::warn!("Line spacing ratio is zero for {preview:?}...");
    }

    commands.extend(layout_text_run(
        metrics,
        &TextRun {
            lines: &lines,
            center: cell.rect.center(),
            left: cell.content_box(paddings).x,
            font: &font,
            size,
            line_spacing_ratio,
            colors: &def.text_colors,
            default_color: color,
            align,
        },
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FixedMetrics;
    use crate::geometry::{Margins, Size};
    use crate::layout::paginate;
    use crate::options::{GridSpec, PaperSize, TextDefaults, TwoSidedOffset};
    use crate::types::{Color, DefinitionText, Entry};
    use std::path::PathBuf;

    fn grid() -> GridSpec {
        // One 200x100pt cell
        GridSpec {
            cols: 1,
            rows: 1,
            paper: PaperSize::Custom {
                width_mm: crate::constants::pt_to_mm(200.0),
                height_mm: crate::constants::pt_to_mm(100.0),
            },
            page_margins: Margins::ZERO,
            margins: Margins::ZERO,
            paddings: Margins::ZERO,
            two_sided_offset: TwoSidedOffset { x_mm: 0.0, y_mm: 0.0 },
            ..Default::default()
        }
    }

    fn context<'a>(grid: &'a GridSpec, text: &'a TextDefaults) -> RenderContext<'a> {
        let layout = crate::layout::GridLayout::new(grid);
        RenderContext {
            grid,
            text,
            layout,
            cut_lines: false,
            caption_font_size: 10.0,
        }
    }

    fn images(commands: &[DrawCommand]) -> Vec<Rect> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    fn chars(commands: &[DrawCommand]) -> Vec<(char, Point, f32, Color)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Char {
                    ch,
                    position,
                    size,
                    color,
                    ..
                } => Some((*ch, *position, *size, *color)),
                _ => None,
            })
            .collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn test_picto_cell_bottom_caption() {
        let grid = grid();
        let text = TextDefaults::default();
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default().with_image("cat.png", Size::new(400.0, 200.0));
        let entries = vec![Entry::new("cat.png", "cat")];

        let page = paginate(&entries, &grid, PageMode::Pictos).next().unwrap();
        let rendered = render_page(&ctx, &page, &metrics);

        assert!(matches!(rendered.commands[0], DrawCommand::Rect { .. }));
        let image = images(&rendered.commands);
        assert_eq!(image.len(), 1);
        // band 20 leaves 200x80
        assert!(close(image[0].width, 160.0));
        assert!(close(image[0].height, 80.0));
        assert!(close(image[0].x, 20.0));
        assert!(close(image[0].y, 0.0));

        // baseline = 100 - 10 + 7 / 2
        let placed = chars(&rendered.commands);
        assert_eq!(placed.len(), 3);
        assert!(placed.iter().all(|(_, p, _, _)| close(p.y, 93.5)));
        // "cat" is 15pt wide at size 10
        assert!(close(placed[0].1.x, 92.5));
    }

    #[test]
    fn test_picto_cell_top_caption_shifts_image() {
        let grid = grid();
        let text = TextDefaults {
            top_aligned: true,
            ..Default::default()
        };
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default().with_image("cat.png", Size::new(400.0, 200.0));
        let entries = vec![Entry::new("cat.png", "cat")];

        let page = paginate(&entries, &grid, PageMode::Pictos).next().unwrap();
        let rendered = render_page(&ctx, &page, &metrics);

        assert!(close(images(&rendered.commands)[0].y, 20.0));
        assert!(chars(&rendered.commands)
            .iter()
            .all(|(_, p, _, _)| close(p.y, 7.0)));
    }

    #[test]
    fn test_missing_image_still_draws_cell() {
        let grid = grid();
        let text = TextDefaults::default();
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default();
        let entries = vec![Entry::new("missing.png", "dog")];

        let page = paginate(&entries, &grid, PageMode::Pictos).next().unwrap();
        let rendered = render_page(&ctx, &page, &metrics);

        assert!(images(&rendered.commands).is_empty());
        assert!(matches!(rendered.commands[0], DrawCommand::Rect { .. }));
        assert_eq!(chars(&rendered.commands).len(), 3);
    }

    #[test]
    fn test_zero_sized_image_is_skipped() {
        let grid = grid();
        let text = TextDefaults::default();
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default().with_image("empty.png", Size::new(0.0, 10.0));
        let entries = vec![Entry::new("empty.png", "x")];

        let page = paginate(&entries, &grid, PageMode::Pictos).next().unwrap();
        let rendered = render_page(&ctx, &page, &metrics);
        assert!(images(&rendered.commands).is_empty());
        assert_eq!(chars(&rendered.commands).len(), 1);
    }

    #[test]
    fn test_definition_precedence() {
        let grid = grid();
        let mut text = TextDefaults {
            color: Color::GREEN,
            ..Default::default()
        };
        text.definitions.size = Some(12.0);
        text.definitions.color = Some(Color::BLUE);
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default();

        let mut own = DefinitionText::new("own");
        own.size = Some(8.0);
        own.color = Some(Color::RED);
        let entries = vec![
            Entry::new("a.png", "a").with_definition(own),
            Entry::new("b.png", "b").with_definition(DefinitionText::new("def")),
        ];

        let first = render_page(
            &ctx,
            &paginate(&entries[..1], &grid, PageMode::Definitions)
                .next()
                .unwrap(),
            &metrics,
        );
        let placed = chars(&first.commands);
        assert!(placed.iter().all(|(_, _, s, c)| *s == 8.0 && *c == Color::RED));

        let second = render_page(
            &ctx,
            &paginate(&entries[1..], &grid, PageMode::Definitions)
                .next()
                .unwrap(),
            &metrics,
        );
        let placed = chars(&second.commands);
        assert!(placed.iter().all(|(_, _, s, c)| *s == 12.0 && *c == Color::BLUE));
    }

    #[test]
    fn test_definition_falls_back_to_caption_settings() {
        let grid = grid();
        let text = TextDefaults {
            color: Color::GREEN,
            font: FontFace::File(PathBuf::from("caption.ttf")),
            ..Default::default()
        };
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default();
        let entries = vec![Entry::new("a.png", "a").with_definition(DefinitionText::new("hi"))];

        let page = paginate(&entries, &grid, PageMode::Definitions)
            .next()
            .unwrap();
        let rendered = render_page(&ctx, &page, &metrics);

        // no borders by default
        assert!(!rendered
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Rect { .. })));
        for command in &rendered.commands {
            match command {
                DrawCommand::Char {
                    font, size, color, position, ..
                } => {
                    assert_eq!(*font, FontFace::File(PathBuf::from("caption.ttf")));
                    assert_eq!(*size, 10.0);
                    assert_eq!(*color, Color::GREEN);
                    assert!(close(position.y, 50.0));
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    #[test]
    fn test_definition_borders_and_blank_text() {
        let grid = grid();
        let text = TextDefaults::default();
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default();

        let mut blank = DefinitionText::new("   ");
        blank.borders = Some(true);
        let entries = vec![Entry::new("a.png", "a").with_definition(blank)];

        let page = paginate(&entries, &grid, PageMode::Definitions)
            .next()
            .unwrap();
        let rendered = render_page(&ctx, &page, &metrics);
        assert_eq!(rendered.commands, vec![DrawCommand::Rect { rect: page.cells[0].rect }]);
    }

    #[test]
    fn test_definition_wraps_and_left_aligns() {
        let mut grid = grid();
        grid.paddings = Margins::uniform(5.0);
        let mut text = TextDefaults::default();
        text.definitions.size = Some(20.0);
        text.definitions.align = Some(TextAlign::Left);
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics::default();

        // 10pt per character, 190pt available
        let entries = vec![
            Entry::new("a.png", "a")
                .with_definition(DefinitionText::new("aaaaaaaaaa bbbbbbbbbb")),
        ];
        let page = paginate(&entries, &grid, PageMode::Definitions)
            .next()
            .unwrap();
        let placed = chars(&render_page(&ctx, &page, &metrics).commands);

        assert_eq!(placed.len(), 20);
        assert!(close(placed[0].1.x, 5.0));
        assert!(close(placed[10].1.x, 5.0));
        assert!(placed[10].1.y > placed[0].1.y);
    }

    #[test]
    fn test_wrap_failure_keeps_definition_on_one_line() {
        let grid = grid();
        let mut text = TextDefaults::default();
        text.definitions.size = Some(20.0);
        let ctx = context(&grid, &text);
        let metrics = FixedMetrics {
            failing_wrap: true,
            ..Default::default()
        };

        // Would wrap into two lines at 10pt per character
        let definition = "aaaaaaaaaa bbbbbbbbbb";
        let entries =
            vec![Entry::new("a.png", "a").with_definition(DefinitionText::new(definition))];
        let page = paginate(&entries, &grid, PageMode::Definitions)
            .next()
            .unwrap();
        let placed = chars(&render_page(&ctx, &page, &metrics).commands);

        let drawn: String = placed.iter().map(|(ch, ..)| *ch).collect();
        assert_eq!(drawn, definition);
        assert!(placed.iter().all(|(_, p, _, _)| close(p.y, 50.0)));
        // 210pt centered on a 200pt cell
        assert!(close(placed[0].1.x, -5.0));
    }

    #[test]
    fn test_cut_lines_precede_cells() {
        let mut grid = grid();
        grid.cols = 2;
        let text = TextDefaults::default();
        let mut ctx = context(&grid, &text);
        ctx.cut_lines = true;
        let metrics = FixedMetrics::default();
        let entries = vec![Entry::new("a.png", "a")];

        let page = paginate(&entries, &grid, PageMode::Pictos).next().unwrap();
        let rendered = render_page(&ctx, &page, &metrics);
        assert!(matches!(rendered.commands[0], DrawCommand::CutLine { .. }));
        assert!(matches!(rendered.commands[1], DrawCommand::Rect { .. }));
    }
}
