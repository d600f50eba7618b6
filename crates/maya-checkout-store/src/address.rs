//! Region -> province -> city -> barangay address hierarchy.
//!
//! Every level carries an `is_available` / `is_disabled` flag pair. A row is
//! selectable when it is available and not disabled.

use rusqlite::{params, Row, ToSql};
use serde::{Deserialize, Serialize};

use crate::db::{new_id, Database};
use crate::error::StoreError;

/// Which rows an address listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressFilter {
    #[default]
    All,
    /// Available and not disabled.
    Selectable,
}

impl AddressFilter {
    fn sql(&self, prefix: &str) -> String {
        match self {
            AddressFilter::All => String::new(),
            AddressFilter::Selectable => {
                format!(" AND {prefix}_is_available = 1 AND {prefix}_is_disabled = 0")
            }
        }
    }
}

/// One level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressLevel {
    Region,
    Province,
    City,
    Barangay,
}

impl AddressLevel {
    /// Table name and column prefix.
    fn prefix(&self) -> &'static str {
        match self {
            AddressLevel::Region => "region",
            AddressLevel::Province => "province",
            AddressLevel::City => "city",
            AddressLevel::Barangay => "barangay",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRow {
    pub region_id: String,
    pub region: String,
    pub region_is_available: bool,
    pub region_is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceRow {
    pub province_id: String,
    pub province: String,
    pub province_region_id: String,
    pub province_is_available: bool,
    pub province_is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRow {
    pub city_id: String,
    pub city: String,
    pub city_province_id: String,
    pub city_is_available: bool,
    pub city_is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarangayRow {
    pub barangay_id: String,
    pub barangay: String,
    pub barangay_city_id: String,
    pub barangay_zip_code: String,
    pub barangay_is_available: bool,
    pub barangay_is_disabled: bool,
}

fn region_from_row(row: &Row<'_>) -> rusqlite::Result<RegionRow> {
    Ok(RegionRow {
        region_id: row.get(0)?,
        region: row.get(1)?,
        region_is_available: row.get(2)?,
        region_is_disabled: row.get(3)?,
    })
}

fn province_from_row(row: &Row<'_>) -> rusqlite::Result<ProvinceRow> {
    Ok(ProvinceRow {
        province_id: row.get(0)?,
        province: row.get(1)?,
        province_region_id: row.get(2)?,
        province_is_available: row.get(3)?,
        province_is_disabled: row.get(4)?,
    })
}

fn city_from_row(row: &Row<'_>) -> rusqlite::Result<CityRow> {
    Ok(CityRow {
        city_id: row.get(0)?,
        city: row.get(1)?,
        city_province_id: row.get(2)?,
        city_is_available: row.get(3)?,
        city_is_disabled: row.get(4)?,
    })
}

fn barangay_from_row(row: &Row<'_>) -> rusqlite::Result<BarangayRow> {
    Ok(BarangayRow {
        barangay_id: row.get(0)?,
        barangay: row.get(1)?,
        barangay_city_id: row.get(2)?,
        barangay_zip_code: row.get(3)?,
        barangay_is_available: row.get(4)?,
        barangay_is_disabled: row.get(5)?,
    })
}

impl Database {
    fn select_rows<T>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn create_region(&self, name: &str) -> Result<RegionRow, StoreError> {
        let conn = self.conn()?;
        let row = RegionRow {
            region_id: new_id(),
            region: name.to_string(),
            region_is_available: true,
            region_is_disabled: false,
        };
        conn.execute(
            "INSERT INTO region_table (region_id, region) VALUES (?1, ?2)",
            params![row.region_id, row.region],
        )?;
        Ok(row)
    }

    pub fn create_province(&self, region_id: &str, name: &str) -> Result<ProvinceRow, StoreError> {
        let conn = self.conn()?;
        let row = ProvinceRow {
            province_id: new_id(),
            province: name.to_string(),
            province_region_id: region_id.to_string(),
            province_is_available: true,
            province_is_disabled: false,
        };
        conn.execute(
            "INSERT INTO province_table (province_id, province, province_region_id) VALUES (?1, ?2, ?3)",
            params![row.province_id, row.province, row.province_region_id],
        )?;
        Ok(row)
    }

    pub fn create_city(&self, province_id: &str, name: &str) -> Result<CityRow, StoreError> {
        let conn = self.conn()?;
        let row = CityRow {
            city_id: new_id(),
            city: name.to_string(),
            city_province_id: province_id.to_string(),
            city_is_available: true,
            city_is_disabled: false,
        };
        conn.execute(
            "INSERT INTO city_table (city_id, city, city_province_id) VALUES (?1, ?2, ?3)",
            params![row.city_id, row.city, row.city_province_id],
        )?;
        Ok(row)
    }

    pub fn create_barangay(
        &self,
        city_id: &str,
        name: &str,
        zip_code: &str,
    ) -> Result<BarangayRow, StoreError> {
        let conn = self.conn()?;
        let row = BarangayRow {
            barangay_id: new_id(),
            barangay: name.to_string(),
            barangay_city_id: city_id.to_string(),
            barangay_zip_code: zip_code.to_string(),
            barangay_is_available: true,
            barangay_is_disabled: false,
        };
        conn.execute(
            "INSERT INTO barangay_table (barangay_id, barangay, barangay_city_id, barangay_zip_code) VALUES (?1, ?2, ?3, ?4)",
            params![row.barangay_id, row.barangay, row.barangay_city_id, row.barangay_zip_code],
        )?;
        Ok(row)
    }

    /// Regions sorted by name.
    pub fn list_regions(&self, filter: AddressFilter) -> Result<Vec<RegionRow>, StoreError> {
        let sql = format!(
            "SELECT region_id, region, region_is_available, region_is_disabled \
             FROM region_table WHERE 1 = 1{} ORDER BY region ASC",
            filter.sql("region")
        );
        self.select_rows(&sql, &[], region_from_row)
    }

    pub fn list_provinces(
        &self,
        region_id: &str,
        filter: AddressFilter,
    ) -> Result<Vec<ProvinceRow>, StoreError> {
        let sql = format!(
            "SELECT province_id, province, province_region_id, province_is_available, province_is_disabled \
             FROM province_table WHERE province_region_id = ?1{} ORDER BY province ASC",
            filter.sql("province")
        );
        self.select_rows(&sql, &[&region_id], province_from_row)
    }

    pub fn list_cities(
        &self,
        province_id: &str,
        filter: AddressFilter,
    ) -> Result<Vec<CityRow>, StoreError> {
        let sql = format!(
            "SELECT city_id, city, city_province_id, city_is_available, city_is_disabled \
             FROM city_table WHERE city_province_id = ?1{} ORDER BY city ASC",
            filter.sql("city")
        );
        self.select_rows(&sql, &[&province_id], city_from_row)
    }

    pub fn list_barangays(
        &self,
        city_id: &str,
        filter: AddressFilter,
    ) -> Result<Vec<BarangayRow>, StoreError> {
        let sql = format!(
            "SELECT barangay_id, barangay, barangay_city_id, barangay_zip_code, barangay_is_available, barangay_is_disabled \
             FROM barangay_table WHERE barangay_city_id = ?1{} ORDER BY barangay ASC",
            filter.sql("barangay")
        );
        self.select_rows(&sql, &[&city_id], barangay_from_row)
    }

    /// Set the flag pair on one row of `level`.
    pub fn set_availability(
        &self,
        level: AddressLevel,
        id: &str,
        is_available: bool,
        is_disabled: bool,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let prefix = level.prefix();

        let rows_affected = conn.execute(
            &format!(
                "UPDATE {prefix}_table SET {prefix}_is_available = ?1, {prefix}_is_disabled = ?2 \
                 WHERE {prefix}_id = ?3"
            ),
            params![is_available, is_disabled, id],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(format!("{prefix} {id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_lists_children_of_parent() {
        let db = Database::new(":memory:").unwrap();

        let calabarzon = db.create_region("CALABARZON").unwrap();
        let ncr = db.create_region("NCR").unwrap();
        let cavite = db.create_province(&calabarzon.region_id, "Cavite").unwrap();
        let laguna = db.create_province(&calabarzon.region_id, "Laguna").unwrap();
        db.create_province(&ncr.region_id, "Metro Manila").unwrap();

        let bacoor = db.create_city(&cavite.province_id, "Bacoor").unwrap();
        db.create_city(&laguna.province_id, "Calamba").unwrap();

        db.create_barangay(&bacoor.city_id, "Molino III", "4102").unwrap();
        db.create_barangay(&bacoor.city_id, "Habay I", "4102").unwrap();

        let provinces: Vec<_> = db
            .list_provinces(&calabarzon.region_id, AddressFilter::All)
            .unwrap()
            .into_iter()
            .map(|p| p.province)
            .collect();
        assert_eq!(provinces, vec!["Cavite", "Laguna"]);

        let cities = db.list_cities(&cavite.province_id, AddressFilter::All).unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].city_province_id, cavite.province_id);

        let barangays: Vec<_> = db
            .list_barangays(&bacoor.city_id, AddressFilter::All)
            .unwrap()
            .into_iter()
            .map(|b| b.barangay)
            .collect();
        assert_eq!(barangays, vec!["Habay I", "Molino III"]);
    }

    #[test]
    fn test_selectable_filter_respects_flag_pair() {
        let db = Database::new(":memory:").unwrap();

        let open = db.create_region("Open").unwrap();
        let unavailable = db.create_region("Unavailable").unwrap();
        let disabled = db.create_region("Disabled").unwrap();

        db.set_availability(AddressLevel::Region, &unavailable.region_id, false, false)
            .unwrap();
        db.set_availability(AddressLevel::Region, &disabled.region_id, true, true)
            .unwrap();

        assert_eq!(db.list_regions(AddressFilter::All).unwrap().len(), 3);

        let selectable = db.list_regions(AddressFilter::Selectable).unwrap();
        assert_eq!(selectable, vec![open]);
    }

    #[test]
    fn test_child_requires_parent() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.create_city("no-such-province", "Nowhere").is_err());
    }

    #[test]
    fn test_set_availability_missing_row() {
        let db = Database::new(":memory:").unwrap();
        let err = db
            .set_availability(AddressLevel::Barangay, "missing", true, false)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
