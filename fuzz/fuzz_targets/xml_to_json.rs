#![no_main]
use libfuzzer_sys::fuzz_target;
use zbridge::{DEFAULT_ROOT_TAG, from_xml_bytes, json_to_xml, xml_to_json};

fuzz_target!(|data: &[u8]| {
    let _ = from_xml_bytes(data);
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(value) = xml_to_json(s) {
            let _ = json_to_xml(&value, DEFAULT_ROOT_TAG);
        }
    }
});
