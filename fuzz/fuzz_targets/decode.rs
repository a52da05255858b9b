#![no_main]
use bflat::{Decoder, Document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = Decoder::new();
    decoder.parse(data);
    while let Some(Ok(view)) = decoder.next() {
        let _ = view.to_string();
        let _ = view.long();
        decoder.recycle(view);
    }
    if let Ok(doc) = Document::from_bytes(data) {
        // Anything that loads must dump to bytes that load and dump identically
        if let Ok(bytes) = doc.to_bytes() {
            let again = Document::from_bytes(&bytes).expect("Dumped document failed to load");
            assert_eq!(again.to_bytes().expect("Reloaded document failed to dump"), bytes);
        }
    }
});
