#![no_main]
use libfuzzer_sys::fuzz_target;
use zbridge::{DEFAULT_ROOT_TAG, from_bytes, json_to_xml, xml_to_json};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = from_bytes(data) {
        if let Ok(xml) = json_to_xml(&value, DEFAULT_ROOT_TAG) {
            let _ = xml_to_json(&xml);
        }
    }
});
