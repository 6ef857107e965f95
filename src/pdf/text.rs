use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

const DEFAULT_GLYPH_WIDTH: f64 = 500.0;
const TJ_WORD_GAP: f64 = -200.0;

#[derive(Copy, Clone, Debug, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let values = operands[..6]
            .iter()
            .map(number)
            .collect::<Option<Vec<f64>>>()?;
        Some(Self {
            a: values[0],
            b: values[1],
            c: values[2],
            d: values[3],
            e: values[4],
            f: values[5],
        })
    }

    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn vertical_scale(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextGlyph {
    pub ch: char,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub size: f64,
}

impl TextGlyph {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.size * 0.3)
    }
}

struct FontInfo<'a> {
    dict: &'a Dictionary,
    two_byte: bool,
    first_char: i64,
    widths: Vec<f64>,
}

impl<'a> FontInfo<'a> {
    fn new(doc: &'a Document, dict: &'a Dictionary) -> Self {
        let two_byte = matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Type0");
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| number(resolve(doc, obj)))
            .unwrap_or(0.0) as i64;
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_array().ok())
            .map(|array| {
                array
                    .iter()
                    .map(|obj| number(resolve(doc, obj)).unwrap_or(DEFAULT_GLYPH_WIDTH))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            dict,
            two_byte,
            first_char,
            widths,
        }
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, byte| (acc << 8) | *byte as u32))
                .collect()
        } else {
            bytes.iter().map(|byte| *byte as u32).collect()
        }
    }

    fn width(&self, code: u32) -> f64 {
        usize::try_from(code as i64 - self.first_char)
            .ok()
            .and_then(|index| self.widths.get(index).copied())
            .filter(|width| *width > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }

    fn decode(&self, doc: &Document, bytes: &[u8]) -> String {
        self.dict
            .get_font_encoding(doc)
            .ok()
            .and_then(|encoding| Document::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_fallback(bytes))
    }
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Option<Vec<u8>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_key: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, FontInfo<'a>>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    glyphs: Vec<TextGlyph>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, page_id: ObjectId) -> Self {
        let fonts = doc
            .get_page_fonts(page_id)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, dict)| (name, FontInfo::new(doc, dict)))
            .collect();

        Self {
            doc,
            fonts,
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            glyphs: Vec::new(),
        }
    }

    fn run(&mut self, content: &Content) {
        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => self.saved.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.saved.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(matrix) = Matrix::from_operands(operands) {
                        self.state.ctm = matrix.multiply(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let [name, size, ..] = operands {
                        if let Ok(name) = name.as_name() {
                            self.state.font_key = Some(name.to_vec());
                        }
                        if let Some(size) = number(size) {
                            self.state.font_size = size;
                        }
                    }
                }
                "Tc" => set_number(operands, &mut self.state.char_spacing),
                "Tw" => set_number(operands, &mut self.state.word_spacing),
                "TL" => set_number(operands, &mut self.state.leading),
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(number) {
                        self.state.horizontal_scale = scale / 100.0;
                    }
                }
                "Td" => {
                    if let [tx, ty, ..] = operands {
                        self.move_line(number(tx).unwrap_or(0.0), number(ty).unwrap_or(0.0));
                    }
                }
                "TD" => {
                    if let [tx, ty, ..] = operands {
                        let ty = number(ty).unwrap_or(0.0);
                        self.state.leading = -ty;
                        self.move_line(number(tx).unwrap_or(0.0), ty);
                    }
                }
                "Tm" => {
                    if let Some(matrix) = Matrix::from_operands(operands) {
                        self.text_matrix = matrix;
                        self.line_matrix = matrix;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "\"" => {
                    if let [word_spacing, char_spacing, Object::String(bytes, _), ..] = operands {
                        self.state.word_spacing = number(word_spacing).unwrap_or(0.0);
                        self.state.char_spacing = number(char_spacing).unwrap_or(0.0);
                        self.next_line();
                        self.show(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Ok(elements)) = operands.first().map(Object::as_array) {
                        for element in elements {
                            match element {
                                Object::String(bytes, _) => self.show(bytes),
                                other => {
                                    if let Some(adjustment) = number(other) {
                                        self.adjust(adjustment);
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.state.leading != 0.0 {
            self.state.leading
        } else {
            self.state.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn adjust(&mut self, adjustment: f64) {
        let tx = -adjustment / 1000.0 * self.state.font_size * self.state.horizontal_scale;
        if adjustment < TJ_WORD_GAP {
            let rendering = self.text_matrix.multiply(&self.state.ctm);
            let (x, y) = rendering.apply(0.0, 0.0);
            self.glyphs.push(TextGlyph {
                ch: ' ',
                x,
                y,
                width: 0.0,
                size: self.state.font_size * rendering.vertical_scale(),
            });
        }
        self.text_matrix = Matrix::translate(tx, 0.0).multiply(&self.text_matrix);
    }

    fn show(&mut self, bytes: &[u8]) {
        let font = self
            .state
            .font_key
            .as_ref()
            .and_then(|key| self.fonts.get(key));

        let (codes, text) = match font {
            Some(font) => (font.codes(bytes), font.decode(self.doc, bytes)),
            None => (
                bytes.iter().map(|byte| *byte as u32).collect(),
                decode_fallback(bytes),
            ),
        };

        let size = self.state.font_size;
        let mut advance = 0.0;
        for code in &codes {
            let width = font.map_or(DEFAULT_GLYPH_WIDTH, |font| font.width(*code));
            let mut glyph_advance = width / 1000.0 * size + self.state.char_spacing;
            if *code == 32 && !font.is_some_and(|font| font.two_byte) {
                glyph_advance += self.state.word_spacing;
            }
            advance += glyph_advance * self.state.horizontal_scale;
        }

        let rendering = self.text_matrix.multiply(&self.state.ctm);
        let (start_x, start_y) = rendering.apply(0.0, 0.0);
        let (end_x, end_y) = rendering.apply(advance, 0.0);
        let effective_size = size * rendering.vertical_scale();

        let chars = text.chars().filter(|ch| !ch.is_control()).collect::<Vec<char>>();
        let count = chars.len().max(1) as f64;
        let step_x = (end_x - start_x) / count;
        let step_y = (end_y - start_y) / count;
        for (index, ch) in chars.into_iter().enumerate() {
            self.glyphs.push(TextGlyph {
                ch,
                x: start_x + step_x * index as f64,
                y: start_y + step_y * index as f64,
                width: step_x.abs(),
                size: effective_size,
            });
        }

        self.text_matrix = Matrix::translate(advance, 0.0).multiply(&self.text_matrix);
    }
}

pub fn page_glyphs(doc: &Document, page_id: ObjectId) -> Result<Vec<TextGlyph>, lopdf::Error> {
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;

    let mut interpreter = Interpreter::new(doc, page_id);
    interpreter.run(&content);
    Ok(interpreter.glyphs)
}

pub fn assemble_lines<'g, I>(glyphs: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'g TextGlyph>,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous: Option<&TextGlyph> = None;

    for glyph in glyphs {
        if let Some(prev) = previous {
            let tolerance = prev.size.max(glyph.size).max(1.0) * 0.5;
            if (glyph.y - prev.y).abs() > tolerance {
                lines.push(std::mem::take(&mut current));
            } else {
                let gap = glyph.x - (prev.x + prev.width);
                if gap > glyph.size.max(1.0) * 0.25 && prev.ch != ' ' && glyph.ch != ' ' {
                    current.push(' ');
                }
            }
        }
        current.push(glyph.ch);
        previous = Some(glyph);
    }
    lines.push(current);

    lines
        .iter()
        .map(|line| line.split_whitespace().collect::<Vec<&str>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<String>>()
        .join(separator)
}

fn decode_fallback(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|byte| *byte as char).collect()
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(*value as f64),
        _ => None,
    }
}

fn set_number(operands: &[Object], target: &mut f64) {
    if let Some(value) = operands.first().and_then(number) {
        *target = value;
    }
}
