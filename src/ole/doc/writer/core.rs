//! Document serialization pipeline
//!
//! The WordDocument stream opens with a zeroed placeholder the size of the
//! header block. The text follows it, then the FKP pages. The table
//! stream receives every table in this fixed order:
//!
//! 1. StyleSheet
//! 2. CLX (piece table)
//! 3. PlcfBteChpx
//! 4. PlcfBtePapx
//! 5. PlcfSed (SEPX grpprls go to the WordDocument stream)
//! 6. PlfLst / PlfLfo, when the source had list tables
//! 7. SttbfFfn
//! 8. DOP
//!
//! The header block is then patched with every recorded (fc, lcb) pair,
//! the text window and `ccpText`, and copied over the placeholder. Each
//! stream is finally zero-padded to the container block size.
use crate::common::binary;
use crate::common::error::Result;
use crate::ole::doc::document::Document;
use crate::ole::doc::options::DocOptions;
use crate::ole::doc::parts::fib::{FcLcb, FibTable};
use crate::ole::doc::parts::property_engine::PropertyBases;

/// Serialized streams ready to hand to a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputStreams {
    /// WordDocument stream
    pub main: Vec<u8>,
    /// 1Table stream
    pub table: Vec<u8>,
    /// Data stream, carried over from the source
    pub data: Vec<u8>,
    /// Table spans in the order they were written
    pub spans: Vec<(FibTable, FcLcb)>,
}

impl OutputStreams {
    /// Span recorded for `table`, if it was written.
    pub fn span(&self, table: FibTable) -> Option<FcLcb> {
        self.spans
            .iter()
            .find(|(written, _)| *written == table)
            .map(|(_, span)| *span)
    }
}

/// Append `bytes` to the table stream and return their span.
fn append(table: &mut Vec<u8>, bytes: &[u8]) -> FcLcb {
    let fc = table.len() as u32;
    table.extend_from_slice(bytes);
    FcLcb::new(fc, bytes.len() as u32)
}

/// Serialize `doc` into fresh streams.
pub fn write_document(
    doc: &Document,
    bases: &PropertyBases,
    options: &DocOptions,
) -> Result<OutputStreams> {
    let mut fib = doc.fib().clone();
    fib.clear_offsets();

    let mut main = vec![0u8; fib.placeholder_size()];
    let mut table = Vec::new();
    let mut spans = Vec::with_capacity(FibTable::WRITE_ORDER.len());

    spans.push((FibTable::StyleSheet, doc.styles().write(&mut table)));

    let fc_min = main.len() as u32;
    let (pieces, clx) = doc.pieces().write(&mut main)?;
    let fc_mac = main.len() as u32;
    spans.push((FibTable::Clx, append(&mut table, &clx)));

    let chp = doc
        .characters()
        .write(&pieces, bases, options, &mut main, &mut table)?;
    spans.push((FibTable::ChpBinTable, chp));
    let pap = doc
        .paragraphs()
        .write(&pieces, bases, options, &mut main, &mut table)?;
    spans.push((FibTable::PapBinTable, pap));

    let sed = doc.sections().write(&mut main, &mut table)?;
    spans.push((FibTable::SectionTable, sed));

    if let Some(lists) = doc.lists() {
        let (lst, lfo) = lists.write(&mut table);
        spans.push((FibTable::ListData, lst));
        spans.push((FibTable::ListOverrides, lfo));
    }

    spans.push((FibTable::FontTable, doc.fonts().write(&mut table)));
    spans.push((FibTable::DocumentProperties, doc.dop().write(&mut table)));

    for (kind, span) in &spans {
        fib.set(*kind, *span)?;
    }
    fib.set_which_table_stream(true)?;
    fib.set_ccp_text(doc.ccp_text())?;
    fib.finalize(fc_min, fc_mac, main.len() as u32)?;
    fib.check_spans(table.len())?;

    let header = fib.serialize();
    main[..header.len()].copy_from_slice(header);

    let mut data = doc.data_stream().to_vec();
    binary::pad_to_blocks(&mut main, options.block_size);
    binary::pad_to_blocks(&mut table, options.block_size);
    binary::pad_to_blocks(&mut data, options.block_size);

    log::debug!(
        "wrote {} bytes of WordDocument, {} bytes of table, {} bytes of data",
        main.len(),
        table.len(),
        data.len()
    );

    Ok(OutputStreams {
        main,
        table,
        data,
        spans,
    })
}
