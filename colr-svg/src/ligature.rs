//! Resolving character sequences to ligature glyphs.
//!
//! The table is built from the GSUB ligature substitution subtables (lookup
//! type 4, also when wrapped in an extension lookup). No shaping happens
//! here: a sequence resolves only if its glyphs exactly match the components
//! of a single rule.

use std::collections::HashMap;

use skrifa::{
    charmap::Charmap,
    raw::{
        tables::gsub::{LigatureSubstFormat1, SubstitutionSubtables},
        ReadError, TableProvider,
    },
    FontRef, GlyphId, MetadataProvider,
};

use crate::Error;

/// A single ligature substitution rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LigatureRule {
    /// Components following the first glyph, in order.
    pub components: Vec<GlyphId>,
    /// The glyph that replaces the full sequence.
    pub ligature: GlyphId,
}

/// Ligature rules keyed by the first component glyph.
#[derive(Clone, Debug, Default)]
pub struct LigatureTable {
    rules: HashMap<GlyphId, Vec<LigatureRule>>,
}

impl LigatureTable {
    /// Collects the ligature rules of every GSUB lookup in the font.
    ///
    /// A font without a GSUB table produces an empty table.
    pub fn new<'a>(font: &impl TableProvider<'a>) -> Result<Self, ReadError> {
        let gsub = match font.gsub() {
            Ok(gsub) => gsub,
            Err(ReadError::TableIsMissing(_)) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        let mut table = Self::default();
        for lookup in gsub.lookup_list()?.lookups().iter() {
            if let SubstitutionSubtables::Ligature(subtables) = lookup?.subtables()? {
                for subtable in subtables.iter() {
                    table.add_subtable(&subtable?)?;
                }
            }
        }
        Ok(table)
    }

    fn add_subtable(&mut self, subtable: &LigatureSubstFormat1) -> Result<(), ReadError> {
        let coverage = subtable.coverage()?;
        for (first, set) in coverage.iter().zip(subtable.ligature_sets().iter()) {
            let rules = set?
                .ligatures()
                .iter()
                .map(|ligature| {
                    let ligature = ligature?;
                    Ok(LigatureRule {
                        components: ligature
                            .component_glyph_ids()
                            .iter()
                            .map(|gid| gid.get().into())
                            .collect(),
                        ligature: ligature.ligature_glyph().into(),
                    })
                })
                .collect::<Result<Vec<_>, ReadError>>()?;
            // a later subtable with the same first glyph replaces these rules
            self.rules.insert(first.into(), rules);
        }
        Ok(())
    }

    /// Returns the ligature for `first` followed by exactly `rest`.
    ///
    /// If a set lists the same components more than once, the last entry
    /// wins.
    pub fn get(&self, first: GlyphId, rest: &[GlyphId]) -> Option<GlyphId> {
        self.rules
            .get(&first)?
            .iter()
            .rfind(|rule| rule.components == rest)
            .map(|rule| rule.ligature)
    }

    /// Returns the rules registered for a first glyph.
    pub fn rules(&self, first: GlyphId) -> &[LigatureRule] {
        self.rules.get(&first).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct first glyphs.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Maps multi-character sequences to ligature glyphs.
#[derive(Clone)]
pub struct Ligatures<'a> {
    charmap: Charmap<'a>,
    table: LigatureTable,
}

impl<'a> Ligatures<'a> {
    pub fn new(font: &FontRef<'a>) -> Result<Self, ReadError> {
        Ok(Self {
            charmap: font.charmap(),
            table: LigatureTable::new(font)?,
        })
    }

    pub fn table(&self) -> &LigatureTable {
        &self.table
    }

    /// Resolves a sequence of characters to a ligature glyph.
    ///
    /// Every character must be present in the character map. Returns
    /// `Ok(None)` if no rule matches the mapped glyphs exactly.
    pub fn resolve(&self, text: &str) -> Result<Option<GlyphId>, Error> {
        let glyphs = text
            .chars()
            .map(|ch| self.charmap.map(ch).ok_or(Error::CharacterNotMapped(ch)))
            .collect::<Result<Vec<_>, _>>()?;
        let (first, rest) = glyphs.split_first().ok_or(Error::EmptyInput)?;
        Ok(self.table.get(*first, rest))
    }
}
