use crate::layout::{DescriptorRange, RootParameter, RootTable, RootType, RootView, ShaderVisibility};
use std::hash::{Hash, Hasher};
use std::ops::Range;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct TableEntry {
	root_index: u32,
	visibility: ShaderVisibility,
	root_type: RootType,
	first_range: usize,
	range_count: usize,
}

impl TableEntry {
	fn ranges(&self) -> Range<usize> {
		self.first_range..self.first_range + self.range_count
	}
}

/// A single growth step, see [`RootParamsManager::extend`].
#[derive(Default)]
struct Extension<'a> {
	table: Option<(u32, ShaderVisibility, RootType, &'a [DescriptorRange])>,
	view: Option<RootView>,
	ranges_for_table: Option<(usize, &'a [DescriptorRange])>,
}

/// Owns all root tables, root views and the descriptor ranges of the tables.
///
/// Descriptor ranges of all tables live in a single arena, with every table referencing its ranges by index. Growing
/// any part rebuilds the arena from scratch and only replaces the previous one once it is complete.
#[derive(Clone, Debug, Default)]
pub struct RootParamsManager {
	tables: Vec<TableEntry>,
	views: Vec<RootView>,
	ranges: Vec<DescriptorRange>,
}

impl RootParamsManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn num_tables(&self) -> usize {
		self.tables.len()
	}

	pub fn num_views(&self) -> usize {
		self.views.len()
	}

	pub fn num_root_parameters(&self) -> usize {
		self.tables.len() + self.views.len()
	}

	pub fn total_descriptor_ranges(&self) -> usize {
		self.ranges.len()
	}

	pub fn table(&self, table_index: usize) -> RootTable<'_> {
		let entry = &self.tables[table_index];
		RootTable {
			root_index: entry.root_index,
			visibility: entry.visibility,
			root_type: entry.root_type,
			ranges: &self.ranges[entry.ranges()],
		}
	}

	pub fn view(&self, view_index: usize) -> &RootView {
		&self.views[view_index]
	}

	/// All tables in the order they were added, which is also ascending root index order.
	pub fn tables(&self) -> impl ExactSizeIterator<Item = RootTable<'_>> + '_ {
		(0..self.tables.len()).map(|i| self.table(i))
	}

	pub fn views(&self) -> impl ExactSizeIterator<Item = &RootView> + '_ {
		self.views.iter()
	}

	/// All root parameters sorted by root index.
	pub fn parameters(&self) -> impl Iterator<Item = RootParameter<'_>> + '_ {
		(0..self.num_root_parameters() as u32).filter_map(|root_index| self.parameter(root_index))
	}

	pub fn parameter(&self, root_index: u32) -> Option<RootParameter<'_>> {
		if let Some(table) = self.tables().find(|table| table.root_index == root_index) {
			return Some(RootParameter::Table(table));
		}
		self.views
			.iter()
			.find(|view| view.root_index == root_index)
			.map(RootParameter::View)
	}

	/// Adds a new root view and returns its view index.
	pub fn add_root_view(&mut self, view: RootView) -> usize {
		self.extend(Extension {
			view: Some(view),
			..Extension::default()
		});
		self.views.len() - 1
	}

	/// Adds a new root table with the initial `ranges` and returns its table index.
	pub fn add_root_table(
		&mut self,
		root_index: u32,
		visibility: ShaderVisibility,
		root_type: RootType,
		ranges: &[DescriptorRange],
	) -> usize {
		self.extend(Extension {
			table: Some((root_index, visibility, root_type, ranges)),
			..Extension::default()
		});
		self.tables.len() - 1
	}

	/// Appends `ranges` to the existing table `table_index`. All other tables keep their ranges in the same order.
	pub fn add_descriptor_ranges(&mut self, table_index: usize, ranges: &[DescriptorRange]) {
		assert!(
			table_index < self.tables.len(),
			"table index {} out of bounds for {} tables",
			table_index,
			self.tables.len()
		);
		self.extend(Extension {
			ranges_for_table: Some((table_index, ranges)),
			..Extension::default()
		});
	}

	/// Rebuilds all storage sized for the new totals, copying every table with corrected range indices and every view,
	/// and swaps the new storage in once the copy has completed.
	fn extend(&mut self, ext: Extension<'_>) {
		let extra_ranges = ext.table.map_or(0, |(.., ranges)| ranges.len())
			+ ext.ranges_for_table.map_or(0, |(_, ranges)| ranges.len());
		let mut ranges = Vec::with_capacity(self.ranges.len() + extra_ranges);
		let mut tables = Vec::with_capacity(self.tables.len() + usize::from(ext.table.is_some()));
		let mut views = Vec::with_capacity(self.views.len() + usize::from(ext.view.is_some()));

		for (table_index, entry) in self.tables.iter().enumerate() {
			let first_range = ranges.len();
			ranges.extend_from_slice(&self.ranges[entry.ranges()]);
			if let Some((_, extra)) = ext.ranges_for_table.filter(|(i, _)| *i == table_index) {
				ranges.extend_from_slice(extra);
			}
			tables.push(TableEntry {
				first_range,
				range_count: ranges.len() - first_range,
				..*entry
			});
		}

		if let Some((root_index, visibility, root_type, new_ranges)) = ext.table {
			let first_range = ranges.len();
			ranges.extend_from_slice(new_ranges);
			tables.push(TableEntry {
				root_index,
				visibility,
				root_type,
				first_range,
				range_count: new_ranges.len(),
			});
		}

		views.extend_from_slice(&self.views);
		views.extend(ext.view);

		debug_assert_eq!(ranges.len(), self.ranges.len() + extra_ranges);
		self.tables = tables;
		self.views = views;
		self.ranges = ranges;
	}
}

impl PartialEq for RootParamsManager {
	fn eq(&self, other: &Self) -> bool {
		self.num_tables() == other.num_tables()
			&& self.num_views() == other.num_views()
			&& self.views().eq(other.views())
			&& self.tables().eq(other.tables())
	}
}

impl Eq for RootParamsManager {}

impl Hash for RootParamsManager {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.num_tables().hash(state);
		self.num_views().hash(state);
		for table in self.tables() {
			table.descriptor_table_size().hash(state);
			table.hash(state);
		}
		for view in self.views() {
			view.hash(state);
		}
	}
}
