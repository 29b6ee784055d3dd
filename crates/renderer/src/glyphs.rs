//! Built-in 5x7 bitmap font for track labels

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal distance between glyph origins
pub const ADVANCE: usize = GLYPH_WIDTH + 1;

// One byte per row, low five bits, most significant bit is the left column
const HASH: [u8; GLYPH_HEIGHT] = [
    0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010,
];

const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

pub fn glyph(ch: char) -> Option<&'static [u8; GLYPH_HEIGHT]> {
    match ch {
        '#' => Some(&HASH),
        '0'..='9' => DIGITS.get(ch as usize - '0' as usize),
        _ => None,
    }
}
