use reqwest::{StatusCode, Version};
use std::io::Write;

/// The single response of a probe run, body fully buffered.
#[derive(Debug)]
pub struct ProbeResponse {
    pub version: Version,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ProbeResponse {
    /// `HTTP/1.1 200 OK` and the like.
    pub fn status_line(&self) -> String {
        format!("{:?} {}", self.version, self.status)
    }

    /// Writes the report printed on success. Body bytes go out untouched.
    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(
            out,
            "\nResponse from server: \n\tHTTP status: {}\n\tBody: ",
            self.status_line()
        )?;
        out.write_all(&self.body)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
