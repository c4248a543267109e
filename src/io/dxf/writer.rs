//! DXF group-code writing.

use std::fmt::Write;

use geo::Coord;

use crate::drawing::{Boundary, DistrictDocument, Entity, Layer, MTextEntity, TextEntity};
use crate::io::dxf::DxfVersion;

/// Line type referenced by every layer.
const CONTINUOUS: &str = "CONTINUOUS";

/// Text style referenced by every text entity.
const STANDARD: &str = "STANDARD";

/// `$INSUNITS` value for metres.
const UNITS_METERS: &str = "6";

/// Block records every R2000 drawing carries; entities belong to the first.
const MODEL_SPACE: &str = "*Model_Space";
const PAPER_SPACE: &str = "*Paper_Space";

struct DxfWriter {
    out: String,
    version: DxfVersion,
    next_handle: u32,
    /// Handle of the `*Model_Space` block record, once written.
    model_space: u32,
    paper_space: u32,
}

impl DxfWriter {
    fn new(version: DxfVersion) -> Self {
        Self { out: String::new(), version, next_handle: 0x20, model_space: 0, paper_space: 0 }
    }

    fn pair(&mut self, code: u16, value: impl std::fmt::Display) {
        // fmt::Write for String never fails
        let _ = write!(self.out, "{code:>3}\n{value}\n");
    }

    fn point(&mut self, code: u16, coord: Coord<f64>) {
        self.pair(code, coord.x);
        self.pair(code + 10, coord.y);
        self.pair(code + 20, 0.0);
    }

    fn allocate(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn handle_pair(&mut self, code: u16, handle: u32) {
        self.pair(code, format_args!("{handle:X}"));
    }

    /// Object handle (group 5), R2000 only. Returns 0 when handles are off.
    fn handle(&mut self) -> u32 {
        if !self.version.has_handles() { return 0 }
        let handle = self.allocate();
        self.handle_pair(5, handle);
        handle
    }

    /// Owner handle (group 330), R2000 only; 0 means no owner.
    fn owner(&mut self, handle: u32) {
        if self.version.has_handles() { self.handle_pair(330, handle) }
    }

    /// Subclass marker (group 100), R2000 only.
    fn subclass(&mut self, name: &str) {
        if self.version.has_handles() { self.pair(100, name) }
    }

    fn begin_section(&mut self, name: &str) {
        self.pair(0, "SECTION");
        self.pair(2, name);
    }

    fn end_section(&mut self) { self.pair(0, "ENDSEC") }

    fn header(&mut self, codepage: &str, handle_seed: u32) {
        self.begin_section("HEADER");
        self.pair(9, "$ACADVER");
        self.pair(1, self.version.acadver());
        self.pair(9, "$DWGCODEPAGE");
        self.pair(3, codepage);
        self.pair(9, "$INSUNITS");
        self.pair(70, UNITS_METERS);
        if self.version.has_handles() {
            self.pair(9, "$HANDSEED");
            self.handle_pair(5, handle_seed);
        }
        self.end_section();
    }

    /// Returns the table's handle, the owner of its records.
    fn begin_table(&mut self, name: &str, count: usize) -> u32 {
        self.pair(0, "TABLE");
        self.pair(2, name);
        let handle = self.handle();
        self.owner(0);
        self.subclass("AcDbSymbolTable");
        self.pair(70, count);
        handle
    }

    fn end_table(&mut self) { self.pair(0, "ENDTAB") }

    fn table_record(&mut self, table: u32, kind: &str, record_subclass: &str, name: &str) -> u32 {
        self.pair(0, kind);
        let handle = self.handle();
        self.owner(table);
        self.subclass("AcDbSymbolTableRecord");
        self.subclass(record_subclass);
        self.pair(2, name);
        handle
    }

    fn linetype(&mut self, table: u32, name: &str, description: &str) {
        self.table_record(table, "LTYPE", "AcDbLinetypeTableRecord", name);
        self.pair(70, 0);
        self.pair(3, description);
        self.pair(72, 65);
        self.pair(73, 0);
        self.pair(40, 0.0);
    }

    fn empty_table(&mut self, name: &str) {
        self.begin_table(name, 0);
        self.end_table();
    }

    fn tables(&mut self, layers: &[Layer]) {
        let full = self.version.has_handles();
        self.begin_section("TABLES");

        if full { self.empty_table("VPORT") }

        let table = self.begin_table("LTYPE", if full { 3 } else { 1 });
        if full {
            self.linetype(table, "ByBlock", "");
            self.linetype(table, "ByLayer", "");
        }
        self.linetype(table, CONTINUOUS, "Solid line");
        self.end_table();

        let table = self.begin_table("LAYER", layers.len() + 1);
        for layer in std::iter::once(&Layer::DEFAULT).chain(layers) {
            self.table_record(table, "LAYER", "AcDbLayerTableRecord", layer.name);
            self.pair(70, 0);
            self.pair(62, layer.color);
            self.pair(6, CONTINUOUS);
        }
        self.end_table();

        let table = self.begin_table("STYLE", 1);
        self.table_record(table, "STYLE", "AcDbTextStyleTableRecord", STANDARD);
        self.pair(70, 0);
        self.pair(40, 0.0);
        self.pair(41, 1.0);
        self.pair(50, 0.0);
        self.pair(71, 0);
        self.pair(42, 2.5);
        self.pair(3, "txt");
        self.pair(4, "");
        self.end_table();

        if full {
            self.empty_table("VIEW");
            self.empty_table("UCS");

            let table = self.begin_table("APPID", 1);
            self.table_record(table, "APPID", "AcDbRegAppTableRecord", "ACAD");
            self.pair(70, 0);
            self.end_table();

            self.begin_table("DIMSTYLE", 0);
            self.subclass("AcDbDimStyleTable");
            self.pair(71, 0);
            self.end_table();

            let table = self.begin_table("BLOCK_RECORD", 2);
            self.model_space = self.table_record(table, "BLOCK_RECORD", "AcDbBlockTableRecord", MODEL_SPACE);
            self.paper_space = self.table_record(table, "BLOCK_RECORD", "AcDbBlockTableRecord", PAPER_SPACE);
            self.end_table();
        }

        self.end_section();
    }

    fn block(&mut self, record: u32, name: &str, paper_space: bool) {
        self.pair(0, "BLOCK");
        self.handle();
        self.owner(record);
        self.subclass("AcDbEntity");
        if paper_space { self.pair(67, 1) }
        self.pair(8, Layer::DEFAULT.name);
        self.subclass("AcDbBlockBegin");
        self.pair(2, name);
        self.pair(70, 0);
        self.point(10, Coord { x: 0.0, y: 0.0 });
        self.pair(3, name);
        self.pair(1, "");

        self.pair(0, "ENDBLK");
        self.handle();
        self.owner(record);
        self.subclass("AcDbEntity");
        if paper_space { self.pair(67, 1) }
        self.pair(8, Layer::DEFAULT.name);
        self.subclass("AcDbBlockEnd");
    }

    /// Empty layout blocks for the two block records. R2000 only.
    fn blocks(&mut self) {
        self.begin_section("BLOCKS");
        self.block(self.model_space, MODEL_SPACE, false);
        self.block(self.paper_space, PAPER_SPACE, true);
        self.end_section();
    }

    /// Root dictionary with an empty ACAD_GROUP dictionary. R2000 only.
    fn objects(&mut self) {
        let root = self.allocate();
        let groups = self.allocate();
        self.begin_section("OBJECTS");

        self.pair(0, "DICTIONARY");
        self.handle_pair(5, root);
        self.owner(0);
        self.subclass("AcDbDictionary");
        self.pair(281, 1);
        self.pair(3, "ACAD_GROUP");
        self.handle_pair(350, groups);

        self.pair(0, "DICTIONARY");
        self.handle_pair(5, groups);
        self.owner(root);
        self.subclass("AcDbDictionary");
        self.pair(281, 1);

        self.end_section();
    }

    fn entities(&mut self, entities: &[Entity]) {
        self.begin_section("ENTITIES");
        for entity in entities {
            match entity {
                Entity::Boundary(boundary) => match self.version {
                    DxfVersion::R12 => self.polyline(boundary),
                    DxfVersion::R2000 => self.lwpolyline(boundary),
                },
                Entity::Text(text) => self.text(text),
                Entity::MText(mtext) => self.mtext(mtext),
            }
        }
        self.end_section();
    }

    fn entity_start(&mut self, kind: &str, layer: &str) {
        self.pair(0, kind);
        self.handle();
        self.owner(self.model_space);
        self.subclass("AcDbEntity");
        self.pair(8, layer);
    }

    fn lwpolyline(&mut self, boundary: &Boundary) {
        self.entity_start("LWPOLYLINE", boundary.layer);
        self.subclass("AcDbPolyline");
        self.pair(90, boundary.points.len());
        self.pair(70, u8::from(boundary.closed));
        for point in &boundary.points {
            self.pair(10, point.x);
            self.pair(20, point.y);
        }
    }

    fn polyline(&mut self, boundary: &Boundary) {
        self.entity_start("POLYLINE", boundary.layer);
        self.pair(66, 1);
        self.point(10, Coord { x: 0.0, y: 0.0 });
        self.pair(70, u8::from(boundary.closed));
        for point in &boundary.points {
            self.entity_start("VERTEX", boundary.layer);
            self.point(10, *point);
        }
        self.entity_start("SEQEND", boundary.layer);
    }

    fn text(&mut self, text: &TextEntity) {
        self.entity_start("TEXT", text.layer);
        self.subclass("AcDbText");
        self.point(10, text.insert);
        self.pair(40, text.height);
        self.pair(1, single_line(&text.text));
        self.pair(7, STANDARD);
        if let Some(align) = text.align_point {
            self.pair(72, text.halign as u8);
            self.point(11, align);
        }
        self.subclass("AcDbText");
        if text.align_point.is_some() {
            self.pair(73, text.valign as u8);
        }
    }

    fn mtext(&mut self, mtext: &MTextEntity) {
        self.entity_start("MTEXT", mtext.layer);
        self.subclass("AcDbMText");
        self.point(10, mtext.insert);
        self.pair(40, mtext.height);
        self.pair(71, mtext.attachment);
        self.pair(1, mtext.text.replace("\r\n", "\\P").replace('\n', "\\P"));
        self.pair(7, STANDARD);
    }
}

/// Group values are line-delimited; a TEXT value must stay on one line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Render a district document as DXF text declaring `codepage` in its header.
pub(crate) fn render_dxf(document: &DistrictDocument, codepage: &str) -> String {
    let version = document.version();

    let mut body = DxfWriter::new(version);
    if version.has_handles() {
        body.begin_section("CLASSES");
        body.end_section();
    }
    body.tables(document.layers());
    if version.has_handles() { body.blocks() }
    body.entities(document.entities());
    if version.has_handles() { body.objects() }

    let mut out = DxfWriter::new(version);
    out.header(codepage, body.next_handle);
    out.out.push_str(&body.out);
    out.pair(0, "EOF");
    out.out
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::geom::Ring;

    fn square() -> Ring {
        Ring::new(vec![
            Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }, Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 },
        ])
    }

    fn values<'a>(dxf: &'a str, code: u16) -> Vec<&'a str> {
        let lines: Vec<&str> = dxf.lines().collect();
        lines.chunks(2)
            .filter(|pair| pair[0].trim() == code.to_string())
            .map(|pair| pair[1])
            .collect()
    }

    fn entities_section(dxf: &str) -> &str {
        let (_, rest) = dxf.split_once("  2\nENTITIES\n").expect("has an ENTITIES section");
        rest.split_once("  0\nENDSEC\n").expect("ENTITIES is closed").0
    }

    /// Group pairs, split into one list per code-0 record.
    fn records(dxf: &str) -> Vec<Vec<(u16, &str)>> {
        let lines: Vec<&str> = dxf.lines().collect();
        let mut out: Vec<Vec<(u16, &str)>> = Vec::new();
        for pair in lines.chunks(2) {
            let code: u16 = pair[0].trim().parse().unwrap();
            if code == 0 { out.push(Vec::new()) }
            out.last_mut().unwrap().push((code, pair[1]));
        }
        out
    }

    fn field<'a>(record: &[(u16, &'a str)], code: u16) -> Option<&'a str> {
        record.iter().find(|(c, _)| *c == code).map(|(_, value)| *value)
    }

    fn of_kind<'r, 'a>(records: &'r [Vec<(u16, &'a str)>], kind: &str) -> Vec<&'r [(u16, &'a str)]> {
        records.iter().filter(|r| r[0].1 == kind).map(Vec::as_slice).collect()
    }

    fn table<'r, 'a>(records: &'r [Vec<(u16, &'a str)>], name: &str) -> &'r [(u16, &'a str)] {
        of_kind(records, "TABLE").into_iter().find(|r| field(r, 2) == Some(name)).expect("table present")
    }

    fn sections<'a>(records: &[Vec<(u16, &'a str)>]) -> Vec<&'a str> {
        of_kind(records, "SECTION").iter().filter_map(|r| field(r, 2)).collect()
    }

    #[test]
    fn r2000_document_structure() {
        let mut document = DistrictDocument::new(DxfVersion::R2000);
        document.add_boundary(square());
        document.add_label("Kizilay-12-345", Point::new(0.5, 0.5), 2.5);

        let dxf = render_dxf(&document, "ANSI_1254");
        assert!(dxf.lines().count() % 2 == 0);
        assert!(dxf.ends_with("  0\nEOF\n"));
        assert_eq!(values(&dxf, 1)[0], "AC1015");
        assert!(values(&dxf, 3).contains(&"ANSI_1254"));

        let kinds = values(&dxf, 0);
        assert_eq!(kinds.iter().filter(|k| **k == "LWPOLYLINE").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "TEXT").count(), 1);
        assert!(values(&dxf, 2).contains(&"PARCELS") && values(&dxf, 2).contains(&"LABELS"));
        assert!(values(&dxf, 1).contains(&"Kizilay-12-345"));
        assert_eq!(values(entities_section(&dxf), 90), vec!["5"]);
    }

    #[test]
    fn r2000_has_block_records_blocks_and_root_dictionary() {
        let mut document = DistrictDocument::new(DxfVersion::R2000);
        document.add_boundary(square());
        document.add_label("a", Point::new(0.5, 0.5), 2.5);
        document.add_label("a\nb", Point::new(0.5, 0.5), 2.5);
        let rendered = render_dxf(&document, "ANSI_1252");
        let records = records(&rendered);

        assert_eq!(sections(&records), vec!["HEADER", "CLASSES", "TABLES", "BLOCKS", "ENTITIES", "OBJECTS"]);

        let block_records = of_kind(&records, "BLOCK_RECORD");
        let names: Vec<_> = block_records.iter().filter_map(|r| field(r, 2)).collect();
        assert_eq!(names, vec![MODEL_SPACE, PAPER_SPACE]);
        let model = field(block_records[0], 5).unwrap();
        let paper = field(block_records[1], 5).unwrap();

        let blocks: Vec<_> = of_kind(&records, "BLOCK").iter()
            .map(|r| (field(r, 2).unwrap(), field(r, 330).unwrap()))
            .collect();
        assert_eq!(blocks, vec![(MODEL_SPACE, model), (PAPER_SPACE, paper)]);
        assert_eq!(of_kind(&records, "ENDBLK").len(), 2);

        for name in ["BLOCK_RECORD", "LAYER", "LTYPE", "STYLE", "APPID"] {
            let owner = field(table(&records, name), 5);
            assert!(owner.is_some());
            assert!(of_kind(&records, name).iter().all(|r| field(r, 330) == owner), "{name} records");
        }

        let drawn: Vec<_> = records.iter()
            .filter(|r| matches!(r[0].1, "LWPOLYLINE" | "TEXT" | "MTEXT"))
            .collect();
        assert_eq!(drawn.len(), 3);
        assert!(drawn.iter().all(|r| field(r, 330) == Some(model)));

        let dictionaries = of_kind(&records, "DICTIONARY");
        assert_eq!(dictionaries.len(), 2);
        assert_eq!(field(dictionaries[0], 330), Some("0"));
        assert_eq!(field(dictionaries[0], 3), Some("ACAD_GROUP"));
        assert_eq!(field(dictionaries[0], 350), field(dictionaries[1], 5));
        assert_eq!(field(dictionaries[1], 330), field(dictionaries[0], 5));
    }

    #[test]
    fn handles_are_unique_and_below_seed() {
        let mut document = DistrictDocument::new(DxfVersion::R2000);
        document.add_boundary(square());
        document.add_boundary(square());
        document.add_label("a", Point::new(0.5, 0.5), 2.5);
        let dxf = render_dxf(&document, "ANSI_1252");

        let mut handles: Vec<u32> = values(&dxf, 5).iter()
            .map(|h| u32::from_str_radix(h, 16).unwrap())
            .collect();
        let seed = handles.remove(0);
        let count = handles.len();
        handles.sort_unstable();
        handles.dedup();
        assert_eq!(handles.len(), count);
        assert!(handles.iter().all(|h| *h < seed));
    }

    #[test]
    fn r12_uses_polyline_and_no_handles() {
        let mut document = DistrictDocument::new(DxfVersion::R12);
        document.add_boundary(square());
        let dxf = render_dxf(&document, "ANSI_1252");

        let kinds = values(&dxf, 0);
        assert!(kinds.contains(&"POLYLINE") && kinds.contains(&"SEQEND"));
        assert_eq!(kinds.iter().filter(|k| **k == "VERTEX").count(), 5);
        assert!(!kinds.contains(&"LWPOLYLINE"));
        assert!(values(&dxf, 5).is_empty());
        assert!(values(&dxf, 100).is_empty());
        assert!(values(&dxf, 330).is_empty());
        assert_eq!(sections(&records(&dxf)), vec!["HEADER", "TABLES", "ENTITIES"]);
    }

    #[test]
    fn aligned_text_writes_alignment_codes() {
        let mut document = DistrictDocument::new(DxfVersion::R2000);
        document.add_label("x", Point::new(10.0, 20.0), 2.5);
        let dxf = render_dxf(&document, "ANSI_1252");
        let entities = entities_section(&dxf);
        assert_eq!(values(entities, 72), vec!["1"]);
        assert_eq!(values(entities, 73), vec!["2"]);
        assert_eq!(values(entities, 11), vec!["10"]);
        assert_eq!(values(entities, 21), vec!["20"]);
    }
}
