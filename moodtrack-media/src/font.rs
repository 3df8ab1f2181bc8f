//! Built-in bitmap glyphs for the frame overlay
//!
//! Printable ASCII uses a classic 5x7 column font (bit 0 is the top row).
//! The eight emoji glyphs used by the display labels get 7x7 pictograms,
//! stored row by row with bit 6 as the leftmost column.

/// Glyph cell height in font pixels
pub const GLYPH_HEIGHT: u32 = 7;

/// Blank font pixels between glyphs
pub const GLYPH_SPACING: u32 = 1;

const FIRST_ASCII: u32 = 0x20;

#[rustfmt::skip]
const ASCII_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

// Shared face outline; mouths and brows are OR'ed in per emoji.
const FACE: [u8; 7] = [
    0b0011100,
    0b0100010,
    0b1010101,
    0b1000001,
    0b1000001,
    0b0100010,
    0b0011100,
];

const fn face(brows: u8, mouth_top: u8, mouth_bottom: u8) -> [u8; 7] {
    [
        FACE[0],
        FACE[1] | brows,
        FACE[2],
        FACE[3],
        FACE[4] | mouth_top,
        FACE[5] | mouth_bottom,
        FACE[6],
    ]
}

const EMOJI_7X7: [(char, [u8; 7]); 8] = [
    ('😠', face(0b0010100, 0b0001000, 0b0010100)),
    ('🤢', face(0, 0b0011000, 0b0000100)),
    ('😨', face(0, 0b0011100, 0b0010100)),
    ('😄', face(0, 0b0010100, 0b0001000)),
    ('😢', face(0, 0b0001000, 0b0010100)),
    ('😲', face(0, 0b0001000, 0b0001000)),
    ('😐', face(0, 0b0011100, 0)),
    ('🙂', face(0, 0b0000100, 0b0001000)),
];

/// Bitmap for a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// 5 columns, bit 0 = top row
    Ascii(&'static [u8; 5]),
    /// 7 rows, bit 6 = leftmost column
    Pictogram(&'static [u8; 7]),
}

impl Glyph {
    /// Width in font pixels
    pub fn width(&self) -> u32 {
        match self {
            Glyph::Ascii(_) => 5,
            Glyph::Pictogram(_) => 7,
        }
    }

    /// Whether font pixel (x, y) is set
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width() || y >= GLYPH_HEIGHT {
            return false;
        }
        match self {
            Glyph::Ascii(columns) => columns[x as usize] >> y & 1 == 1,
            Glyph::Pictogram(rows) => rows[y as usize] >> (6 - x) & 1 == 1,
        }
    }
}

/// Glyph for a character; `None` for zero-width characters.
///
/// Characters without a bitmap fall back to `?`.
pub fn glyph(c: char) -> Option<Glyph> {
    if c == '\u{FE0F}' || c == '\u{200D}' {
        return None;
    }

    let code = c as u32;
    if (FIRST_ASCII..FIRST_ASCII + ASCII_5X7.len() as u32).contains(&code) {
        return Some(Glyph::Ascii(&ASCII_5X7[(code - FIRST_ASCII) as usize]));
    }

    if let Some((_, rows)) = EMOJI_7X7.iter().find(|(emoji, _)| *emoji == c) {
        return Some(Glyph::Pictogram(rows));
    }

    Some(Glyph::Ascii(&ASCII_5X7[('?' as u32 - FIRST_ASCII) as usize]))
}
