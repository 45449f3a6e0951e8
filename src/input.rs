use crate::error::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{stdin, Read};
use std::path::Path;

/// Reads an instance document from a file, a gzip-compressed file (`.gz`) or, for `-`,
/// from stdin.
pub fn read_instance(path: &Path) -> Result<String> {
    let mut input: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(stdin())
    } else {
        let file = File::open(path)?;
        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        }
    };
    let mut xml = String::new();
    input.read_to_string(&mut xml)?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn reads_plain_and_compressed() {
        let dir = std::env::temp_dir().join(format!("itc2zimpl-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let plain = dir.join("inst.xml");
        std::fs::write(&plain, "<Instance/>").unwrap();
        assert_eq!(read_instance(&plain).unwrap(), "<Instance/>");

        let packed = dir.join("inst.xml.gz");
        let mut enc = GzEncoder::new(File::create(&packed).unwrap(), Compression::default());
        enc.write_all(b"<Instance/>").unwrap();
        enc.finish().unwrap();
        assert_eq!(read_instance(&packed).unwrap(), "<Instance/>");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_instance(Path::new("/nonexistent/instance.xml")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
