//! 试卷 PDF 渲染 - 基础设施层
//!
//! 只负责把 `Paper` 排版成 A4 表格，不参与选题

use std::path::Path;

use chrono::Local;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Paper;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 5.0;
const CELL_PADDING: f32 = 2.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;

/// 表格列：(表头, 列宽 mm)
const COLUMNS: [(&str, f32); 4] = [("No.", 12.0), ("Unit", 30.0), ("Marks", 16.0), ("Question", 122.0)];

/// Question 列每行容纳的字符数（Helvetica 10pt 的近似值）
const QUESTION_WRAP: usize = 66;
const UNIT_WRAP: usize = 15;

/// 试卷渲染器
#[derive(Debug, Clone)]
pub struct PaperRenderer {
    /// 生成日期，默认为当天
    date: String,
}

impl Default for PaperRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// 渲染过程中的页面状态
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// 当前书写位置（距页面底部）
    cursor: f32,
    pages: usize,
}

impl Canvas {
    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        let line = Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    /// 画一行表格，返回行高
    fn row(&mut self, cells: &[Vec<String>; 4], bold: bool) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = lines as f32 * LINE_HEIGHT + CELL_PADDING * 2.0;
        let top = self.cursor;
        let bottom = top - height;

        let mut x = MARGIN;
        for (cell, (_, width)) in cells.iter().zip(COLUMNS.iter()) {
            for (i, text) in cell.iter().enumerate() {
                let baseline = top - CELL_PADDING - LINE_HEIGHT * (i as f32 + 1.0) + 1.0;
                self.text(text, FONT_SIZE, x + CELL_PADDING, baseline, bold);
            }
            self.line((x, top), (x, bottom));
            x += width;
        }
        self.line((x, top), (x, bottom));
        self.line((MARGIN, top), (x, top));
        self.line((MARGIN, bottom), (x, bottom));

        self.cursor = bottom;
        height
    }
}

impl PaperRenderer {
    pub fn new() -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// 固定生成日期（用于可复现的输出）
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// 渲染为 PDF 字节
    pub fn render(&self, paper: &Paper) -> AppResult<Vec<u8>> {
        let title = format!("Question Paper {}", paper.number);
        let (doc, page, layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::PdfRender(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::PdfRender(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut canvas = Canvas {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };

        canvas.cursor -= TITLE_SIZE * 0.5;
        canvas.text(&title, TITLE_SIZE, MARGIN, canvas.cursor, true);
        canvas.cursor -= LINE_HEIGHT * 1.6;
        let meta = format!(
            "Total Marks: {}    Questions: {}    Date: {}",
            paper.total_marks(),
            paper.question_count(),
            self.date
        );
        canvas.text(&meta, FONT_SIZE, MARGIN, canvas.cursor, false);
        canvas.cursor -= LINE_HEIGHT * 1.5;

        let header = header_cells();
        canvas.row(&header, true);

        for (number, unit, question) in paper.numbered() {
            let cells = [
                vec![number.to_string()],
                wrap(unit, UNIT_WRAP),
                vec![question.marks.to_string()],
                wrap(&question.display_text(), QUESTION_WRAP),
            ];
            let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
            let needed = lines as f32 * LINE_HEIGHT + CELL_PADDING * 2.0;

            // 放不下就换页，并重复表头
            if canvas.cursor - needed < MARGIN {
                canvas.new_page();
                canvas.row(&header, true);
            }
            canvas.row(&cells, false);
        }

        debug!("试卷 {} 渲染完成，共 {} 页", paper.number, canvas.pages);

        canvas
            .doc
            .save_to_bytes()
            .map_err(|e| AppError::PdfRender(e.to_string()))
    }

    /// 渲染并写入文件（自动创建父目录）
    pub fn write_to(&self, paper: &Paper, path: &Path) -> AppResult<()> {
        let bytes = self.render(paper)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn header_cells() -> [Vec<String>; 4] {
    COLUMNS.map(|(name, _)| vec![name.to_string()])
}

/// 按单词换行，超长单词强制截断
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }

        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
