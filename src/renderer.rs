use patience::card::{CardId, Rank, Suit};
use patience::{CardDimensions, CardSet, Surface};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap};

/// Cards in the terminal are bordered boxes measured in cells.
pub const TERMINAL_CARDS: CardDimensions = CardDimensions {
    width: 9,
    height: 6,
    min_width: 5,
    min_height: 4,
    min_visible: 4,
};

const TABLE: Style = Style::new().bg(Color::Green);

/// How a card face is drawn in the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFace {
    pub label: String,
    pub style: Style,
}

/// One face per card of a standard deck.
pub fn terminal_card_set() -> CardSet<CardFace> {
    let faces = Suit::ALL.iter().flat_map(|&suit| {
        Rank::ALL.iter().map(move |&rank| {
            let id = CardId::new(rank, suit);
            let fg = if suit.is_red() { Color::Red } else { Color::Black };
            let face = CardFace {
                label: id.label(),
                style: Style::new().fg(fg).bg(Color::White),
            };
            (id, face)
        })
    });
    CardSet::with_images(TERMINAL_CARDS, faces)
}

/// Paint one card. The label sits top-left and bottom-right so that it shows
/// whichever side of the card a fan leaves uncovered.
pub fn paint_card(buf: &mut Buffer, face: &CardFace, area: Rect) {
    let area = area.intersection(buf.area);
    if area.width < 2 || area.height < 2 {
        return;
    }
    Clear.render(area, buf);
    Block::bordered()
        .border_type(BorderType::Rounded)
        .style(face.style)
        .render(area, buf);

    let label_width = face.label.chars().count() as u16;
    let inner = area.inner(ratatui::layout::Margin::new(1, 1));
    if inner.is_empty() {
        return;
    }
    let bold = face.style.add_modifier(Modifier::BOLD);
    buf.set_stringn(inner.x, inner.y, &face.label, inner.width as usize, bold);
    if inner.height > 1 && inner.width >= label_width {
        let x = inner.right() - label_width;
        buf.set_stringn(x, inner.bottom() - 1, &face.label, inner.width as usize, bold);
    }
}

/// The table, kept between frames so only dirty piles are repainted.
#[derive(Debug)]
pub struct TerminalSurface {
    buffer: Buffer,
}

impl TerminalSurface {
    pub fn new(size: Size) -> Self {
        let mut surface = TerminalSurface {
            buffer: Buffer::empty(Rect::from((Position::ORIGIN, size))),
        };
        surface.buffer.set_style(surface.buffer.area, TABLE);
        surface
    }

    pub fn resize(&mut self, size: Size) {
        self.buffer.resize(Rect::from((Position::ORIGIN, size)));
    }
}

impl Surface for TerminalSurface {
    type Image = CardFace;

    fn size(&self) -> Size {
        self.buffer.area.as_size()
    }

    fn clear(&mut self, area: Rect) {
        let area = area.intersection(self.buffer.area);
        Clear.render(area, &mut self.buffer);
        self.buffer.set_style(area, TABLE);
    }

    fn draw_image(&mut self, face: &CardFace, area: Rect) {
        paint_card(&mut self.buffer, face, area);
    }
}

impl Widget for &TerminalSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for position in area.positions() {
            if let (Some(src), Some(dst)) = (self.buffer.cell(position), buf.cell_mut(position)) {
                *dst = src.clone();
            }
        }
    }
}

/// Messages shown on the bottom line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
    Won(String),
}

impl Status {
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let (tag, text, style) = match self {
            Status::Info(text) => ("[INFO]", text, Style::new().fg(Color::Cyan)),
            Status::Error(text) => ("[ERR ]", text, Style::new().fg(Color::Red)),
            Status::Won(text) => ("[WIN!]", text, Style::new().fg(Color::Yellow)),
        };
        Clear.render(area, buf);
        buf.set_stringn(area.x, area.y, format!("{} {}", tag, text), area.width as usize, style);
    }
}

const HELP: &str = "\
GOAL: build each suit up from Ace to King on the four centre foundations.

RULES:
  · Move one card at a time from the top (outer end) of a row.
  · A row takes any card one rank lower than its top card, any suit.
  · An empty row takes any card.
  · Cards on a foundation stay there.

MOUSE:
  drag with the left button    move a card
  right click                  send a card to its best place

KEYS:
  a   auto-finish (when every row is in order)
  n   new deal        r   replay this deal
  ?   toggle help     q   quit";

/// A centred help panel.
pub fn render_help(title: &str, area: Rect, buf: &mut Buffer) {
    let width = area.width.min(66);
    let height = area.height.min(20);
    let panel = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    Clear.render(panel, buf);
    Paragraph::new(HELP)
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .title(format!(" {} – Help ", title)),
        )
        .render(panel, buf);
}
