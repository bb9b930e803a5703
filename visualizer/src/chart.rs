use ecosimcore::math::StatsHelper;
use ecosimcore::projection::{ChartDataset, ChartKind};
use iced::{
    mouse,
    widget::canvas::{self, path::Arc as ArcSegment, Frame, Geometry, Path, Stroke, Text},
    Color, Point, Radians, Rectangle, Renderer, Size, Theme,
};
use std::f32::consts::PI;
use std::sync::Arc;

/// Green palette shared by bars, pie slices and lines.
pub const ECO_GREEN_PALETTE: [(u8, u8, u8); 5] = [
    (0x2D, 0x5A, 0x27),
    (0x4A, 0x8B, 0x3D),
    (0x68, 0xBC, 0x45),
    (0x98, 0xD9, 0x89),
    (0xC6, 0xE5, 0xBE),
];

pub fn palette_color(index: usize) -> Color {
    let (r, g, b) = ECO_GREEN_PALETTE[index % ECO_GREEN_PALETTE.len()];
    Color::from_rgb8(r, g, b)
}

const MARGIN: f32 = 24.0;

/// Canvas adapter drawing a projected dataset the way its chart kind asks.
#[derive(Clone)]
pub struct ChartCanvas {
    dataset: Arc<ChartDataset>,
}

impl ChartCanvas {
    pub fn new(dataset: Arc<ChartDataset>) -> Self {
        Self { dataset }
    }

    fn draw_bars(&self, frame: &mut Frame, size: Size) {
        let values = self.dataset.values();
        let Some((min, max)) = StatsHelper::extent(&values) else {
            return;
        };
        let floor = min.min(0.0);
        let span = (max.max(0.0) - floor).max(f64::EPSILON);
        let plot_height = size.height - 2.0 * MARGIN;
        let slot = (size.width - 2.0 * MARGIN) / values.len() as f32;
        let baseline = MARGIN + plot_height * (max.max(0.0) / span) as f32;

        for (idx, point) in self.dataset.points.iter().enumerate() {
            let height = plot_height * (point.value.abs() / span) as f32;
            let top = if point.value >= 0.0 {
                baseline - height
            } else {
                baseline
            };
            let x = MARGIN + idx as f32 * slot + slot * 0.15;
            frame.fill_rectangle(
                Point::new(x, top),
                Size::new(slot * 0.7, height.max(1.0)),
                palette_color(idx),
            );
            frame.fill_text(Text {
                content: point.label.clone(),
                position: Point::new(x, size.height - MARGIN + 4.0),
                color: Color::from_rgb(0.85, 0.85, 0.85),
                ..Text::default()
            });
        }
    }

    fn draw_line(&self, frame: &mut Frame, size: Size) {
        let values = self.dataset.values();
        let Some((min, max)) = StatsHelper::extent(&values) else {
            return;
        };
        let range = (max - min).max(1.0);
        let width = size.width - 2.0 * MARGIN;
        let height = size.height - 2.0 * MARGIN;
        let step = if values.len() > 1 {
            width / (values.len() as f32 - 1.0)
        } else {
            0.0
        };
        let position = |idx: usize, value: f64| {
            let normalized = ((value - min) / range) as f32;
            Point::new(
                MARGIN + idx as f32 * step,
                MARGIN + height - normalized * height,
            )
        };

        let path = Path::new(|builder| {
            for (idx, value) in values.iter().enumerate() {
                let point = position(idx, *value);
                if idx == 0 {
                    builder.move_to(point);
                } else {
                    builder.line_to(point);
                }
            }
        });
        frame.stroke(
            &path,
            Stroke::default()
                .with_width(2.5)
                .with_color(palette_color(0)),
        );

        for (idx, point) in self.dataset.points.iter().enumerate() {
            let at = position(idx, point.value);
            let marker = Path::new(|builder| builder.circle(at, 3.5));
            frame.fill(&marker, palette_color(2));
            frame.fill_text(Text {
                content: point.label.clone(),
                position: Point::new(at.x - 12.0, size.height - MARGIN + 4.0),
                color: Color::from_rgb(0.85, 0.85, 0.85),
                ..Text::default()
            });
        }
    }

    fn draw_pie(&self, frame: &mut Frame, size: Size) {
        let shares = StatsHelper::part_of_whole(&self.dataset.values());
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let radius = size.width.min(size.height) / 2.0 - MARGIN;

        let mut start = -PI / 2.0;
        for (idx, share) in shares.iter().enumerate() {
            if *share <= 0.0 {
                continue;
            }
            let end = start + (*share as f32) * 2.0 * PI;
            let slice = Path::new(|builder| {
                builder.move_to(center);
                builder.arc(ArcSegment {
                    center,
                    radius,
                    start_angle: Radians(start),
                    end_angle: Radians(end),
                });
                builder.close();
            });
            frame.fill(&slice, palette_color(idx));
            start = end;
        }
    }
}

impl<Message> canvas::Program<Message> for ChartCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.07, 0.05),
        );

        if self.dataset.is_empty() {
            frame.fill_text(Text {
                content: "No data for this selection".into(),
                position: Point::new(MARGIN, MARGIN),
                color: Color::from_rgb(0.7, 0.7, 0.7),
                ..Text::default()
            });
        } else {
            match self.dataset.selection.chart_kind {
                ChartKind::Bar => self.draw_bars(&mut frame, bounds.size()),
                ChartKind::Line => self.draw_line(&mut frame, bounds.size()),
                ChartKind::Pie => self.draw_pie(&mut frame, bounds.size()),
            }
        }

        vec![frame.into_geometry()]
    }
}
