//! The field deriver: builds more informative columns out of the raw
//! compound values.
use crate::errors::PipelineError;
use crate::table::{Cell, Table};

pub const CABIN_COLUMN: &str = "Cabin";
pub const NAME_COLUMN: &str = "Name";

pub const CABIN_DECK_COLUMN: &str = "CabinDeck";
pub const CABIN_NUM_COLUMN: &str = "CabinNum";
pub const CABIN_SIDE_COLUMN: &str = "CabinSide";
pub const GROUP_ID_COLUMN: &str = "GroupId";
pub const FAMILY_NAME_COLUMN: &str = "FamilyName";

/// Derive the five enrichment columns. Pure and deterministic: the input
/// is untouched, row count and index order carry over, the original
/// columns stay, and the derived columns are appended after them.
///
/// Missing or malformed cabins and names degrade to missing values; an
/// index whose group segment does not parse as an i32 fails the whole
/// transform.
pub fn derive_fields(table: &Table) -> Result<Table, PipelineError> {
    for required in [CABIN_COLUMN, NAME_COLUMN] {
        if table.column_position(required).is_none() {
            return Err(PipelineError::Transform(format!(
                "required column {} not found",
                required
            )));
        }
    }

    let mut decks = Vec::with_capacity(table.len());
    let mut nums = Vec::with_capacity(table.len());
    let mut sides = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let parts = split_cabin(table.cell(row, CABIN_COLUMN));
        let [deck, num, side] = parts;
        decks.push(deck);
        nums.push(num);
        sides.push(side);
    }

    let group_ids = table
        .index()
        .iter()
        .map(|id| {
            let group = id.split('_').next().unwrap_or(id);
            group
                .parse::<i32>()
                .map(|g| Cell::Int(i64::from(g)))
                .map_err(|_| {
                    PipelineError::Transform(format!(
                        "index value {} has no numeric group segment",
                        id
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let family_names = (0..table.len())
        .map(|row| family_name(table.cell(row, NAME_COLUMN)))
        .collect();

    let mut enriched = table.clone();
    enriched.push_column(CABIN_DECK_COLUMN, decks)?;
    enriched.push_column(CABIN_NUM_COLUMN, nums)?;
    enriched.push_column(CABIN_SIDE_COLUMN, sides)?;
    enriched.push_column(GROUP_ID_COLUMN, group_ids)?;
    enriched.push_column(FAMILY_NAME_COLUMN, family_names)?;
    Ok(enriched)
}

/// "Deck/Num/Side" into its three segments. A missing or non-string cabin
/// gives three missing values; short values leave the tail missing.
fn split_cabin(cabin: Option<&Cell>) -> [Cell; 3] {
    let mut out = [Cell::Null, Cell::Null, Cell::Null];
    if let Some(value) = cabin.and_then(Cell::as_str) {
        for (slot, part) in out.iter_mut().zip(value.split('/')) {
            *slot = Cell::Str(part.to_string());
        }
    }
    out
}

/// Second whitespace-delimited token of the full name, verbatim (no
/// trimming, punctuation retained). Fewer than two tokens is a missing
/// value.
fn family_name(name: Option<&Cell>) -> Cell {
    match name.and_then(Cell::as_str).and_then(|n| n.split(' ').nth(1)) {
        Some(token) => Cell::Str(token.to_string()),
        None => Cell::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
PassengerId,HomePlanet,Cabin,Age,Name
0001_01,Europa,B/0/P,39.0,Maham Ofracculy
0002_01,Earth,F/0/S,24.0,Juanna Vines
0003_02,Europa,A/0/S,58.0,Altark Susent
";

    fn fixture() -> Table {
        Table::from_csv(FIXTURE.as_bytes(), "PassengerId").unwrap()
    }

    #[test]
    fn derives_cabin_parts_group_id_and_family_name() {
        // the name is quoted so the comma survives the CSV layer
        let data = "PassengerId,Cabin,Name\n7_1,F/123/P,\"John Smith, Esq\"\n";
        let table = Table::from_csv(data.as_bytes(), "PassengerId").unwrap();
        let enriched = derive_fields(&table).unwrap();

        assert_eq!(
            enriched.cell(0, CABIN_DECK_COLUMN),
            Some(&Cell::Str("F".to_string()))
        );
        assert_eq!(
            enriched.cell(0, CABIN_NUM_COLUMN),
            Some(&Cell::Str("123".to_string()))
        );
        assert_eq!(
            enriched.cell(0, CABIN_SIDE_COLUMN),
            Some(&Cell::Str("P".to_string()))
        );
        assert_eq!(enriched.cell(0, GROUP_ID_COLUMN), Some(&Cell::Int(7)));
        // second token, comma retained, no trimming
        assert_eq!(
            enriched.cell(0, FAMILY_NAME_COLUMN),
            Some(&Cell::Str("Smith,".to_string()))
        );
    }

    #[test]
    fn appends_columns_after_the_originals() {
        let enriched = derive_fields(&fixture()).unwrap();
        assert_eq!(
            enriched.columns(),
            &[
                "HomePlanet",
                "Cabin",
                "Age",
                "Name",
                "CabinDeck",
                "CabinNum",
                "CabinSide",
                "GroupId",
                "FamilyName"
            ]
        );
    }

    #[test]
    fn preserves_row_identity_and_order() {
        let table = fixture();
        let enriched = derive_fields(&table).unwrap();
        assert_eq!(enriched.index(), table.index());
        assert_eq!(enriched.len(), table.len());
    }

    #[test]
    fn is_deterministic() {
        let table = fixture();
        assert_eq!(derive_fields(&table).unwrap(), derive_fields(&table).unwrap());
    }

    #[test]
    fn missing_cabin_yields_missing_parts() {
        let data = "PassengerId,Cabin,Name\n0001_01,,Maham Ofracculy\n";
        let enriched =
            derive_fields(&Table::from_csv(data.as_bytes(), "PassengerId").unwrap()).unwrap();
        assert_eq!(enriched.cell(0, CABIN_DECK_COLUMN), Some(&Cell::Null));
        assert_eq!(enriched.cell(0, CABIN_NUM_COLUMN), Some(&Cell::Null));
        assert_eq!(enriched.cell(0, CABIN_SIDE_COLUMN), Some(&Cell::Null));
    }

    #[test]
    fn short_cabin_leaves_tail_missing() {
        let data = "PassengerId,Cabin,Name\n0001_01,B/0,Maham Ofracculy\n";
        let enriched =
            derive_fields(&Table::from_csv(data.as_bytes(), "PassengerId").unwrap()).unwrap();
        assert_eq!(
            enriched.cell(0, CABIN_DECK_COLUMN),
            Some(&Cell::Str("B".to_string()))
        );
        assert_eq!(enriched.cell(0, CABIN_SIDE_COLUMN), Some(&Cell::Null));
    }

    #[test]
    fn single_token_name_yields_missing_family_name() {
        let data = "PassengerId,Cabin,Name\n0001_01,B/0/P,Cher\n";
        let enriched =
            derive_fields(&Table::from_csv(data.as_bytes(), "PassengerId").unwrap()).unwrap();
        assert_eq!(enriched.cell(0, FAMILY_NAME_COLUMN), Some(&Cell::Null));
    }

    #[test]
    fn unparseable_group_id_fails_the_transform() {
        let data = "PassengerId,Cabin,Name\nnope_01,B/0/P,Maham Ofracculy\n";
        let err = derive_fields(&Table::from_csv(data.as_bytes(), "PassengerId").unwrap())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transform(_)));
    }

    #[test]
    fn missing_source_column_fails_the_transform() {
        let data = "PassengerId,Name\n0001_01,Maham Ofracculy\n";
        let err = derive_fields(&Table::from_csv(data.as_bytes(), "PassengerId").unwrap())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transform(_)));
    }
}
