mod chordgym;
