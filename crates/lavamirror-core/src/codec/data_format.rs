//! Primitivas del formato binario: big-endian, textos UTF-8 con prefijo u16.

use std::io::{self, Read, Write};

use crate::error::CodecError;

pub fn write_u8<W: Write>(output: &mut W, value: u8) -> Result<(), CodecError> {
    output.write_all(&[value])?;
    Ok(())
}

pub fn read_u8<R: Read>(input: &mut R) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn write_bool<W: Write>(output: &mut W, value: bool) -> Result<(), CodecError> {
    write_u8(output, value as u8)
}

pub fn read_bool<R: Read>(input: &mut R) -> Result<bool, CodecError> {
    marker(read_u8(input)?)
}

pub fn write_u64<W: Write>(output: &mut W, value: u64) -> Result<(), CodecError> {
    output.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn read_u64<R: Read>(input: &mut R) -> Result<u64, CodecError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

pub fn write_text<W: Write>(output: &mut W, text: &str) -> Result<(), CodecError> {
    let bytes = text.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| CodecError::TextTooLong(bytes.len()))?;
    output.write_all(&len.to_be_bytes())?;
    output.write_all(bytes)?;
    Ok(())
}

pub fn read_text<R: Read>(input: &mut R) -> Result<String, CodecError> {
    let mut len = [0u8; 2];
    input.read_exact(&mut len)?;
    let mut bytes = vec![0u8; u16::from_be_bytes(len) as usize];
    input.read_exact(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_nullable_text<W: Write>(output: &mut W, text: Option<&str>) -> Result<(), CodecError> {
    match text {
        Some(text) => {
            write_bool(output, true)?;
            write_text(output, text)
        }
        None => write_bool(output, false),
    }
}

pub fn read_nullable_text<R: Read>(input: &mut R) -> Result<Option<String>, CodecError> {
    if read_bool(input)? {
        Ok(Some(read_text(input)?))
    } else {
        Ok(None)
    }
}

/// Como [`read_nullable_text`], pero el fin de la entrada antes del marcador
/// equivale a un texto nulo (bloque que nunca se escribió).
pub fn read_trailing_nullable_text<R: Read>(input: &mut R) -> Result<Option<String>, CodecError> {
    let mut buf = [0u8; 1];
    let read = loop {
        match input.read(&mut buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };

    if read == 0 || !marker(buf[0])? {
        return Ok(None);
    }
    Ok(Some(read_text(input)?))
}

fn marker(byte: u8) -> Result<bool, CodecError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidMarker(other)),
    }
}
