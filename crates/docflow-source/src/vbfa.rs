//! VBFA (sales document flow) reader for Parquet files.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use docflow_core::{DocflowError, DocumentRecord};

use crate::error::{SourceError, SourceResult};

/// A column we read, with the width integer-typed values are zero-padded to.
struct Column {
    name: &'static str,
    pad: usize,
    required: bool,
}

const COLUMNS: &[Column] = &[
    Column { name: "VBELN", pad: 10, required: true },
    Column { name: "MANDT", pad: 3, required: true },
    Column { name: "VBTYP_N", pad: 0, required: true },
    Column { name: "POSNV", pad: 6, required: false },
    Column { name: "POSNN", pad: 6, required: false },
    Column { name: "ERDAT", pad: 8, required: true },
    Column { name: "ERZET", pad: 6, required: true },
    Column { name: "VBELV", pad: 10, required: false },
    Column { name: "VBTYP_V", pad: 0, required: false },
];

/// Rows read from a VBFA file.
#[derive(Debug, Default)]
pub struct VbfaTable {
    /// Rows with every required field present, in file order.
    pub records: Vec<DocumentRecord>,
    /// Rows rejected because a required field was null.
    pub rejected: Vec<DocflowError>,
}

impl VbfaTable {
    /// Total rows seen in the file.
    pub fn row_count(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Read a VBFA table from a Parquet file.
///
/// All nine columns must exist in the schema. Values are cast to strings;
/// integer columns are zero-padded back to their SAP width, so an `ERZET`
/// stored as `80000` reads as `"080000"`.
pub fn read_parquet(path: &Path) -> SourceResult<VbfaTable> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    for column in COLUMNS {
        if builder.schema().field_with_name(column.name).is_err() {
            return Err(SourceError::MissingColumn(column.name));
        }
    }

    let reader = builder.build()?;
    let mut table = VbfaTable::default();

    for batch in reader {
        let batch = batch?;
        append_batch(&mut table, &batch)?;
        debug!(rows = batch.num_rows(), total = table.row_count(), "Read VBFA batch");
    }

    info!(
        path = %path.display(),
        rows = table.records.len(),
        rejected = table.rejected.len(),
        "Read VBFA table"
    );
    Ok(table)
}

/// Convert one record batch and append its rows to `table`.
pub fn append_batch(table: &mut VbfaTable, batch: &RecordBatch) -> SourceResult<()> {
    let mut columns = Vec::with_capacity(COLUMNS.len());
    for column in COLUMNS {
        let array = batch
            .column_by_name(column.name)
            .ok_or(SourceError::MissingColumn(column.name))?;
        columns.push(StringColumn::new(array, column.pad)?);
    }

    let [vbeln, mandt, vbtyp_n, posnv, posnn, erdat, erzet, vbelv, vbtyp_v]: [StringColumn; 9] =
        columns
            .try_into()
            .map_err(|_| SourceError::MissingColumn("VBELN"))?;

    let offset = table.row_count();
    for i in 0..batch.num_rows() {
        let row = offset + i;

        let missing = COLUMNS
            .iter()
            .zip([&vbeln, &mandt, &vbtyp_n, &posnv, &posnn, &erdat, &erzet, &vbelv, &vbtyp_v])
            .find(|(column, values)| column.required && values.get(i).is_none())
            .map(|(column, _)| column.name);

        if let Some(field) = missing {
            table.rejected.push(DocflowError::MissingField { row, field });
            continue;
        }

        table.records.push(DocumentRecord {
            row,
            document_number: vbeln.get(i).unwrap_or_default(),
            client: mandt.get(i).unwrap_or_default(),
            doc_type_code: vbtyp_n.get(i).unwrap_or_default(),
            prev_document_number: vbelv.get(i),
            prev_doc_type_code: vbtyp_v.get(i).unwrap_or_default(),
            current_item_pos: posnn.get(i),
            prev_item_pos: posnv.get(i),
            creation_date: erdat.get(i).unwrap_or_default(),
            creation_time: erzet.get(i).unwrap_or_default(),
        });
    }

    Ok(())
}

/// A column cast to UTF-8, remembering whether it was an integer.
struct StringColumn {
    values: ArrayRef,
    pad: Option<usize>,
}

impl StringColumn {
    fn new(array: &ArrayRef, pad: usize) -> SourceResult<Self> {
        let integer = array.data_type().is_integer();
        let values = cast(array, &DataType::Utf8)?;
        Ok(Self {
            values,
            pad: (integer && pad > 0).then_some(pad),
        })
    }

    fn get(&self, i: usize) -> Option<String> {
        let strings = self.values.as_any().downcast_ref::<StringArray>()?;
        if strings.is_null(i) {
            return None;
        }
        let value = strings.value(i);
        Some(match self.pad {
            Some(width) => format!("{:0>width$}", value, width = width),
            None => value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::Int64Array;
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    fn utf8(values: Vec<Option<&str>>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("MANDT", DataType::Utf8, true),
            Field::new("VBELV", DataType::Utf8, true),
            Field::new("POSNV", DataType::Utf8, true),
            Field::new("VBELN", DataType::Utf8, true),
            Field::new("POSNN", DataType::Utf8, true),
            Field::new("VBTYP_N", DataType::Utf8, true),
            Field::new("ERDAT", DataType::Utf8, true),
            Field::new("ERZET", DataType::Int64, true),
            Field::new("VBTYP_V", DataType::Utf8, true),
            Field::new("RFMNG", DataType::Utf8, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                utf8(vec![Some("100"), Some("100"), Some("200")]),
                utf8(vec![Some("0000004711"), None, Some("0000004712")]),
                utf8(vec![Some("000010"), None, Some("000020")]),
                utf8(vec![Some("0080000001"), Some("0000004711"), None]),
                utf8(vec![Some("000010"), Some("000010"), Some("000010")]),
                utf8(vec![Some("J"), Some("C"), Some("M")]),
                utf8(vec![Some("20230101"), Some("20221231"), Some("20230102")]),
                Arc::new(Int64Array::from(vec![Some(80000), Some(235959), Some(1)])),
                utf8(vec![Some("C"), None, Some("J")]),
                utf8(vec![Some("1"), Some("2"), Some("3")]),
            ],
        )
        .unwrap()
    }

    fn write_parquet(batch: &RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn test_read_parquet() {
        let file = write_parquet(&sample_batch());
        let table = read_parquet(file.path()).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.records.len(), 2);

        let first = &table.records[0];
        assert_eq!(first.row, 0);
        assert_eq!(first.document_number, "0080000001");
        assert_eq!(first.client, "100");
        assert_eq!(first.doc_type_code, "J");
        assert_eq!(first.prev_document_number.as_deref(), Some("0000004711"));
        assert_eq!(first.prev_doc_type_code, "C");
        assert_eq!(first.creation_time, "080000");

        let second = &table.records[1];
        assert_eq!(second.row, 1);
        assert_eq!(second.prev_document_number, None);
        assert_eq!(second.prev_doc_type_code, "");
        assert_eq!(second.prev_item_pos, None);
    }

    #[test]
    fn test_null_required_field_is_rejected() {
        let file = write_parquet(&sample_batch());
        let table = read_parquet(file.path()).unwrap();

        assert_eq!(table.rejected.len(), 1);
        assert!(matches!(
            table.rejected[0],
            DocflowError::MissingField { row: 2, field: "VBELN" }
        ));
    }

    #[test]
    fn test_missing_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("VBELN", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(schema, vec![utf8(vec![Some("1")])]).unwrap();
        let file = write_parquet(&batch);

        let err = read_parquet(file.path()).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn("MANDT")));
    }

    #[test]
    fn test_row_indices_continue_across_batches() {
        let batch = sample_batch();
        let mut table = VbfaTable::default();
        append_batch(&mut table, &batch).unwrap();
        append_batch(&mut table, &batch).unwrap();

        assert_eq!(table.row_count(), 6);
        let rows: Vec<_> = table.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1, 3, 4]);
        assert!(matches!(table.rejected[1], DocflowError::MissingField { row: 5, .. }));
    }
}
