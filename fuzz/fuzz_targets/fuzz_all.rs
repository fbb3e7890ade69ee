#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xlgrid::{SheetDecoder, Xlsx};

fuzz_target!(|data: &[u8]| {
    // raw worksheet markup
    let strings = vec!["a".to_string(), "b".to_string()];
    let mut sheet = SheetDecoder::new(&strings, &[]).decode("fuzz.xml", data);
    while sheet.next_row() {
        let _ = sheet.strings();
    }

    // whole archives
    let mut workbook = match Xlsx::new(Cursor::new(data)) {
        Ok(excel) => excel,
        Err(_) => return,
    };
    workbook.with_limits(1_000, 100);
    for name in workbook.sheet_names() {
        if let Ok(mut sheet) = workbook.worksheet(&name) {
            while sheet.next_row() {
                let _ = sheet.strings();
            }
            sheet.rows().flatten().filter(|c| !c.is_empty()).count();
        }
    }
});
