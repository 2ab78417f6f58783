use crate::frame::Frame;

use rtusniff::token::Timestamp;

/// Flat row for one decoded frame, ready for tabular export.
///
/// Fields that do not apply to a frame kind are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub kind: &'static str,
    pub timestamp: Option<Timestamp>,
    pub slave_id: Option<u8>,
    pub function_code: Option<u8>,
    pub address: Option<u16>,
    pub count: Option<u16>,
    pub byte_count: Option<u8>,
    pub payload: Option<Vec<String>>,
    pub value: Option<u8>,
    pub checksum: Option<String>,
    pub raw: String,
    pub total_length: usize,
}

impl Record {
    fn base(frame: &Frame) -> Self {
        Record {
            kind: frame.kind().as_str(),
            timestamp: frame.timestamp(),
            slave_id: frame.slave_id(),
            function_code: frame.function_code(),
            address: None,
            count: None,
            byte_count: None,
            payload: None,
            value: None,
            checksum: frame.checksum().map(String::from),
            raw: frame.raw(),
            total_length: frame.total_length(),
        }
    }
}

impl From<&Frame> for Record {
    fn from(frame: &Frame) -> Self {
        let base = Record::base(frame);
        match frame {
            Frame::ReadRequest(request) => Record {
                address: Some(request.address),
                count: Some(request.count),
                ..base
            },
            Frame::ReadResponse(response) => Record {
                byte_count: Some(response.byte_count),
                payload: Some(
                    response
                        .payload_text()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                ),
                ..base
            },
            Frame::WriteSingleRequest(request) => Record {
                address: Some(request.address),
                value: Some(request.value),
                ..base
            },
            Frame::WriteSingleResponse(response) => Record {
                address: Some(response.address),
                value: Some(response.value),
                ..base
            },
            Frame::Unrecognized(_) => base,
        }
    }
}

impl Frame {
    pub fn to_record(&self) -> Record {
        Record::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use rtusniff::token;
    use serde_json::json;

    #[test]
    fn test_read_transaction_records() {
        let request = token::tokenize("11 03 00 6B 00 03 76 87", 10.0).unwrap();
        let response = token::tokenize("11 03 06 AE 41 56 52 43 40 49 AD", 10.5).unwrap();
        let tokens = [request, response].concat();

        let records: Vec<Record> = scan(&tokens).iter().map(Frame::to_record).collect();
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([
                {
                    "kind": "ReadRequest",
                    "timestamp": 10.0,
                    "slave_id": 17,
                    "function_code": 3,
                    "address": 107,
                    "count": 3,
                    "byte_count": null,
                    "payload": null,
                    "value": null,
                    "checksum": "7687",
                    "raw": "1103006B00037687",
                    "total_length": 8
                },
                {
                    "kind": "ReadResponse",
                    "timestamp": 10.5,
                    "slave_id": 17,
                    "function_code": 3,
                    "address": null,
                    "count": null,
                    "byte_count": 6,
                    "payload": ["AE", "41", "56", "52", "43", "40"],
                    "value": null,
                    "checksum": "49AD",
                    "raw": "110306AE415652434049AD",
                    "total_length": 11
                }
            ])
        );
    }

    #[test]
    fn test_unrecognized_record() {
        let tokens = token::tokenize("DE AD BE EF DE AD BE EF", 1.0).unwrap();
        let records: Vec<Record> = scan(&tokens).iter().map(Frame::to_record).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "UnrecognizedSpan");
        assert_eq!(records[0].slave_id, None);
        assert_eq!(records[0].checksum, None);
        assert_eq!(records[0].raw, "DEADBEEFDEADBEEF");
        assert_eq!(records[0].timestamp, Some(1.0));
    }
}
